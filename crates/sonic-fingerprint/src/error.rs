// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FingerprintError>;

/// Why an AcoustID lookup produced no candidates.
///
/// Only surfaced through [`crate::AcoustidClient::try_lookup`]; the public
/// lookup entry points turn every variant into an empty candidate list.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("AcoustID API error: HTTP {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("AcoustID lookup status {status}: {message}")]
    LookupStatus { status: String, message: String },

    #[error("AcoustID response has no results field")]
    MissingResults,

    #[error("Invalid response from AcoustID API: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
