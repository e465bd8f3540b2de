// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("catalog responded with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid response from catalog: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
