// SPDX-License-Identifier: GPL-3.0-or-later

//! Client for the primary fingerprint-matching service.
//!
//! Every call here is a required pipeline stage: failures are returned as
//! [`PrimaryError`] and never retried. The one exception is
//! [`PrimaryClient::check_health`], which reports failure as `false`.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{PrimaryClient, PrimaryClientBuilder};
pub use error::{PrimaryError, Result};
pub use transport::Transport;
