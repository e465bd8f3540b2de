// SPDX-License-Identifier: GPL-3.0-or-later
use sonic_config::AppConfig;
use sonic_fingerprint::{AcoustidClient, FingerprintError};
use sonic_metadata::{CatalogClient, CatalogError};
use sonic_primary::{PrimaryClient, PrimaryError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub mod orchestrator;
pub mod services;

pub use orchestrator::RecognitionOrchestrator;
pub use services::{AcousticLookup, MatchService, MetadataEnricher};

/// A client could not be constructed from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("primary service client: {0}")]
    Primary(#[from] PrimaryError),
    #[error("AcoustID client: {0}")]
    Fingerprint(#[from] FingerprintError),
    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),
}

/// Wired-up clients for one configuration.
///
/// The orchestrator shares the same client instances, so inventory calls and
/// recognition reuse one connection pool per service.
#[derive(Clone)]
pub struct Sonic {
    primary: Arc<PrimaryClient>,
    acoustid: Arc<AcoustidClient>,
    catalog: Arc<CatalogClient>,
    orchestrator: RecognitionOrchestrator,
}

impl Sonic {
    pub fn from_config(config: &AppConfig) -> Result<Self, SetupError> {
        let mut primary = PrimaryClient::builder(config.primary.base_url.clone());
        if let Some(secs) = config.primary.timeout_secs {
            primary = primary.timeout(Duration::from_secs(secs));
        }
        let primary = Arc::new(primary.build()?);

        let acoustid = Arc::new(
            AcoustidClient::builder(config.lookup.api_key.clone())
                .base_url(config.lookup.base_url.clone())
                .build()?,
        );

        let catalog = Arc::new(
            CatalogClient::builder()
                .base_url(config.catalog.base_url.clone())
                .credential(config.catalog.client_credential.clone())
                .build()?,
        );

        let orchestrator =
            RecognitionOrchestrator::new(primary.clone(), catalog.clone(), acoustid.clone());

        info!(
            target: "application",
            primary = %primary.base_url(),
            "recognition pipeline ready"
        );

        Ok(Self {
            primary,
            acoustid,
            catalog,
            orchestrator,
        })
    }

    /// Registration, inventory and health calls.
    pub fn primary(&self) -> &PrimaryClient {
        &self.primary
    }

    pub fn acoustid(&self) -> &AcoustidClient {
        &self.acoustid
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn orchestrator(&self) -> &RecognitionOrchestrator {
        &self.orchestrator
    }
}
