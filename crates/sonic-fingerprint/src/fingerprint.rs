// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{FingerprintError, Result};
use serde::{Deserialize, Serialize};

/// Compact acoustic signature produced by an external tool such as `fpcalc`.
///
/// Only used as input to the AcoustID lookup; this crate never computes one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fingerprint {
    /// Encoded fingerprint (standard or URL-safe base64).
    pub hash: String,
    /// Length of the fingerprinted audio in seconds.
    pub duration: u32,
}

impl Fingerprint {
    pub fn new(hash: impl Into<String>, duration: u32) -> Self {
        Self {
            hash: hash.into(),
            duration,
        }
    }

    /// Rejects fingerprints AcoustID would refuse before spending a request.
    pub fn validate(&self) -> Result<()> {
        if self.hash.is_empty() {
            return Err(FingerprintError::InvalidFingerprint(
                "fingerprint hash is empty".to_string(),
            ));
        }

        if self.duration == 0 {
            return Err(FingerprintError::InvalidFingerprint(
                "duration must be > 0".to_string(),
            ));
        }

        let trimmed = self.hash.trim_end_matches('=');
        if trimmed.is_empty() || self.hash.len() - trimmed.len() > 2 {
            return Err(FingerprintError::InvalidFingerprint(
                "invalid base64 padding".to_string(),
            ));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '-' | '_'))
        {
            return Err(FingerprintError::InvalidFingerprint(
                "fingerprint contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}
