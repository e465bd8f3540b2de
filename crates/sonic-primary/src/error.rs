// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrimaryError>;

/// Failure of a required call against the primary fingerprint service.
#[derive(Debug, Error)]
pub enum PrimaryError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Non-success status; `message` is the service's reason or a fallback.
    #[error("{message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid JSON response")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl PrimaryError {
    /// HTTP status of a rejected call, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RequestFailed(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
