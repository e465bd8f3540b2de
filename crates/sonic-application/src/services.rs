// SPDX-License-Identifier: GPL-3.0-or-later

//! Seams between the orchestrator and the external services it drives.

use async_trait::async_trait;
use sonic_domain::{AudioAsset, CatalogEntry, LookupCandidate, MatchResult};
use sonic_fingerprint::{AcoustidClient, Fingerprint};
use sonic_metadata::CatalogClient;
use sonic_primary::{PrimaryClient, PrimaryError};

/// Required stage: primary recognition.
#[async_trait]
pub trait MatchService: Send + Sync {
    async fn recognize(
        &self,
        asset: &AudioAsset,
        use_custom_algorithm: bool,
    ) -> Result<MatchResult, PrimaryError>;
}

/// Optional stage: catalog enrichment. `None` covers both "no match" and failure.
#[async_trait]
pub trait MetadataEnricher: Send + Sync {
    async fn enrich(&self, song_title: &str) -> Option<CatalogEntry>;
}

/// Optional stage: external acoustic lookup. Failure is an empty list.
#[async_trait]
pub trait AcousticLookup: Send + Sync {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Vec<LookupCandidate>;
}

#[async_trait]
impl MatchService for PrimaryClient {
    async fn recognize(
        &self,
        asset: &AudioAsset,
        use_custom_algorithm: bool,
    ) -> Result<MatchResult, PrimaryError> {
        PrimaryClient::recognize(self, asset, use_custom_algorithm).await
    }
}

#[async_trait]
impl MetadataEnricher for CatalogClient {
    async fn enrich(&self, song_title: &str) -> Option<CatalogEntry> {
        CatalogClient::enrich(self, song_title).await
    }
}

#[async_trait]
impl AcousticLookup for AcoustidClient {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Vec<LookupCandidate> {
        self.lookup_fingerprint(fingerprint).await
    }
}
