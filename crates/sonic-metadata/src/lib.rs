// SPDX-License-Identifier: GPL-3.0-or-later

//! Music catalog search used to enrich confident matches.

pub mod catalog;
pub mod error;

pub use catalog::{CatalogClient, CatalogClientBuilder};
pub use error::{CatalogError, Result};
