// SPDX-License-Identifier: GPL-3.0-or-later

//! AcoustID fingerprint lookup.
//!
//! The lookup is an optional pipeline stage: transport errors, error
//! statuses and malformed bodies all come back as an empty candidate list.

pub mod acoustid;
pub mod error;
pub mod fingerprint;

pub use acoustid::{AcoustidClient, AcoustidClientBuilder};
pub use error::{FingerprintError, Result};
pub use fingerprint::Fingerprint;
