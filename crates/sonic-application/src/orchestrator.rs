// SPDX-License-Identifier: GPL-3.0-or-later

//! Recognition pipeline.
//!
//! Primary recognition is required and its failure is returned as-is.
//! Catalog enrichment runs only for confident matches, and external lookup
//! runs only when a caller asks for it; neither can fail the request.

use crate::services::{AcousticLookup, MatchService, MetadataEnricher};
use sonic_domain::{AudioAsset, MatchResult, ENRICHMENT_THRESHOLD};
use sonic_fingerprint::Fingerprint;
use sonic_primary::PrimaryError;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct RecognitionOrchestrator {
    matcher: Arc<dyn MatchService>,
    enricher: Arc<dyn MetadataEnricher>,
    lookup: Arc<dyn AcousticLookup>,
}

impl RecognitionOrchestrator {
    pub fn new(
        matcher: Arc<dyn MatchService>,
        enricher: Arc<dyn MetadataEnricher>,
        lookup: Arc<dyn AcousticLookup>,
    ) -> Self {
        Self {
            matcher,
            enricher,
            lookup,
        }
    }

    /// Recognize an audio file and attach catalog metadata to a confident match.
    ///
    /// Enrichment is attempted exactly once, and only when the match names a
    /// song with confidence strictly above [`ENRICHMENT_THRESHOLD`]. A missing
    /// catalog entry leaves `metadata` unset.
    ///
    /// # Errors
    /// Only a primary recognition failure, unchanged.
    pub async fn recognize_and_enrich(
        &self,
        asset: &AudioAsset,
        use_custom_algorithm: bool,
    ) -> Result<MatchResult, PrimaryError> {
        let result = self.matcher.recognize(asset, use_custom_algorithm).await?;

        if !result.is_confident() {
            debug!(
                target: "recognition",
                song = %result.song_name,
                confidence = ?result.confidence,
                threshold = ENRICHMENT_THRESHOLD,
                "skipping enrichment"
            );
            return Ok(result);
        }

        match self.enricher.enrich(&result.song_name).await {
            Some(entry) => {
                info!(
                    target: "recognition",
                    song = %result.song_name,
                    catalog_id = %entry.id,
                    "match enriched"
                );
                Ok(result.with_metadata(entry))
            }
            None => {
                debug!(target: "recognition", song = %result.song_name, "no catalog metadata");
                Ok(result)
            }
        }
    }

    /// Ask the external lookup service about a fingerprint.
    ///
    /// Meant for callers whose primary match came back weak or empty. Returns
    /// the highest-scoring candidate that has a titled recording, as an
    /// external-lookup [`MatchResult`].
    pub async fn lookup_external(&self, fingerprint: &Fingerprint) -> Option<MatchResult> {
        let candidates = self.lookup.lookup(fingerprint).await;
        debug!(target: "recognition", candidates = candidates.len(), "external lookup finished");

        candidates
            .iter()
            .filter_map(MatchResult::from_candidate)
            .max_by(|a, b| {
                a.confidence
                    .unwrap_or_default()
                    .total_cmp(&b.confidence.unwrap_or_default())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use sonic_domain::{CatalogEntry, LookupCandidate, MatchSource, Recording, RecordingArtist};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeMatcher(Result<MatchResult, u16>);

    #[async_trait]
    impl MatchService for FakeMatcher {
        async fn recognize(
            &self,
            _asset: &AudioAsset,
            _use_custom_algorithm: bool,
        ) -> Result<MatchResult, PrimaryError> {
            self.0.clone().map_err(|status| PrimaryError::ApiError {
                status,
                message: "file is required".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct CountingEnricher {
        entry: Option<CatalogEntry>,
        calls: AtomicUsize,
        titles: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MetadataEnricher for CountingEnricher {
        async fn enrich(&self, song_title: &str) -> Option<CatalogEntry> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.titles.lock().unwrap().push(song_title.to_string());
            self.entry.clone()
        }
    }

    struct FixedLookup(Vec<LookupCandidate>);

    #[async_trait]
    impl AcousticLookup for FixedLookup {
        async fn lookup(&self, _fingerprint: &Fingerprint) -> Vec<LookupCandidate> {
            self.0.clone()
        }
    }

    fn catalog_entry() -> CatalogEntry {
        CatalogEntry {
            id: "1".to_string(),
            name: "X".to_string(),
            artist: "Y".to_string(),
            album: "Z".to_string(),
            album_art_url: String::new(),
            preview_url: None,
            catalog_url: String::new(),
        }
    }

    fn orchestrator(
        matched: Result<MatchResult, u16>,
        enricher: Arc<CountingEnricher>,
    ) -> RecognitionOrchestrator {
        RecognitionOrchestrator::new(
            Arc::new(FakeMatcher(matched)),
            enricher,
            Arc::new(FixedLookup(Vec::new())),
        )
    }

    fn asset() -> AudioAsset {
        AudioAsset::new("clip.wav", vec![0u8; 16])
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[tokio::test]
    async fn confident_match_gets_catalog_entry() {
        let recognized = MatchResult::local("X", Some(0.9));
        let enricher = Arc::new(CountingEnricher {
            entry: Some(catalog_entry()),
            ..Default::default()
        });

        let result = orchestrator(Ok(recognized.clone()), enricher.clone())
            .recognize_and_enrich(&asset(), false)
            .await
            .unwrap();

        assert_eq!(result, recognized.with_metadata(catalog_entry()));
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*enricher.titles.lock().unwrap(), vec!["X".to_string()]);
    }

    #[tokio::test]
    async fn empty_match_never_enriches() {
        let recognized = MatchResult::local("", None);
        let enricher = Arc::new(CountingEnricher {
            entry: Some(catalog_entry()),
            ..Default::default()
        });

        let result = orchestrator(Ok(recognized.clone()), enricher.clone())
            .recognize_and_enrich(&asset(), false)
            .await
            .unwrap();

        assert!(result.metadata.is_none());
        assert_eq!(result, recognized);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_catalog_entry_leaves_result_untouched() {
        let recognized = MatchResult::local("X", Some(0.75));
        let enricher = Arc::new(CountingEnricher::default());

        let result = orchestrator(Ok(recognized.clone()), enricher.clone())
            .recognize_and_enrich(&asset(), true)
            .await
            .unwrap();

        assert_eq!(result, recognized);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn primary_failure_propagates_without_enrichment() {
        let enricher = Arc::new(CountingEnricher::default());

        let err = orchestrator(Err(400), enricher.clone())
            .recognize_and_enrich(&asset(), false)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "file is required");
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn external_lookup_picks_best_titled_candidate() {
        let recording = |title: &str| Recording {
            id: format!("rec-{title}"),
            title: title.to_string(),
            artists: vec![RecordingArtist {
                name: "Portishead".to_string(),
            }],
        };
        let candidates = vec![
            LookupCandidate {
                id: "a".to_string(),
                score: 0.6,
                recordings: vec![recording("Roads")],
            },
            LookupCandidate {
                id: "b".to_string(),
                score: 0.99,
                recordings: vec![recording("")],
            },
            LookupCandidate {
                id: "c".to_string(),
                score: 0.8,
                recordings: vec![recording("Glory Box")],
            },
        ];
        let orchestrator = RecognitionOrchestrator::new(
            Arc::new(FakeMatcher(Ok(MatchResult::local("", None)))),
            Arc::new(CountingEnricher::default()),
            Arc::new(FixedLookup(candidates)),
        );

        let result = orchestrator
            .lookup_external(&Fingerprint::new("AQADvEWZ", 120))
            .await
            .unwrap();

        assert_eq!(result.song_name, "Glory Box");
        assert_eq!(result.confidence, Some(0.8));
        assert_eq!(result.source, MatchSource::ExternalLookup);
    }

    #[tokio::test]
    async fn external_lookup_without_candidates() {
        let orchestrator = orchestrator(
            Ok(MatchResult::local("", None)),
            Arc::new(CountingEnricher::default()),
        );
        assert!(orchestrator
            .lookup_external(&Fingerprint::new("AQADvEWZ", 120))
            .await
            .is_none());
    }

    proptest! {
        #[test]
        fn low_confidence_never_enriches(
            confidence in prop::option::of(0.0f64..=0.5),
            name in "[A-Za-z ]{0,12}",
        ) {
            let recognized = MatchResult::local(name, confidence);
            let enricher = Arc::new(CountingEnricher {
                entry: Some(catalog_entry()),
                ..Default::default()
            });

            let result = block_on(
                orchestrator(Ok(recognized.clone()), enricher.clone())
                    .recognize_and_enrich(&asset(), false),
            )
            .unwrap();

            prop_assert!(result.metadata.is_none());
            prop_assert_eq!(result, recognized);
            prop_assert_eq!(enricher.calls.load(Ordering::SeqCst), 0);
        }

        #[test]
        fn high_confidence_enriches_exactly_once(
            confidence in 0.500_001f64..=1.0,
            name in "[A-Za-z][A-Za-z ]{0,11}",
            found in any::<bool>(),
        ) {
            let recognized = MatchResult::local(name.clone(), Some(confidence));
            let enricher = Arc::new(CountingEnricher {
                entry: found.then(catalog_entry),
                ..Default::default()
            });

            let result = block_on(
                orchestrator(Ok(recognized.clone()), enricher.clone())
                    .recognize_and_enrich(&asset(), false),
            )
            .unwrap();

            prop_assert_eq!(enricher.calls.load(Ordering::SeqCst), 1);
            prop_assert_eq!(enricher.titles.lock().unwrap().clone(), vec![name]);
            prop_assert_eq!(result.metadata.is_some(), found);
        }
    }
}
