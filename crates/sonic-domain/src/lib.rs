// SPDX-License-Identifier: GPL-3.0-or-later

//! Domain types shared by the recognition pipeline.
//!
//! Every third-party response shape (primary match, AcoustID lookup,
//! catalog search) is resolved into one of these records at its adapter
//! boundary, so nothing past an adapter sees untyped JSON.

use serde::{Deserialize, Serialize};

/// Confidence a primary match must strictly exceed before catalog
/// enrichment is attempted.
pub const ENRICHMENT_THRESHOLD: f64 = 0.5;

/// Artist name used when a third-party record credits nobody.
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// Audio input
// ============================================================================

/// An audio file handed to the primary service for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    file_name: String,
    bytes: Vec<u8>,
}

impl AudioAsset {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Display name sent as the multipart file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ============================================================================
// Match results
// ============================================================================

/// Which stage produced a [`MatchResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchSource {
    #[default]
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "external-lookup", alias = "acoustid")]
    ExternalLookup,
}

/// Outcome of a recognition request.
///
/// Deserializes directly from the primary service's `/recognize` body;
/// `metadata` is only ever set by the recognition orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Matched song, empty when nothing matched.
    #[serde(default)]
    pub song_name: String,
    /// Match certainty in `[0, 1]`; absent when the service reported none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Fingerprinting algorithm the service used.
    #[serde(rename = "fft_impl", default, skip_serializing_if = "Option::is_none")]
    pub algorithm_label: Option<String>,
    #[serde(default)]
    pub source: MatchSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CatalogEntry>,
}

impl MatchResult {
    /// A local match with the given name and confidence.
    pub fn local(song_name: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            song_name: song_name.into(),
            confidence,
            message: None,
            algorithm_label: None,
            source: MatchSource::Local,
            metadata: None,
        }
    }

    /// True when the match names a song and its confidence is strictly above
    /// [`ENRICHMENT_THRESHOLD`].
    pub fn is_confident(&self) -> bool {
        !self.song_name.is_empty()
            && self
                .confidence
                .is_some_and(|confidence| confidence > ENRICHMENT_THRESHOLD)
    }

    /// True when a caller may want to escalate to an external lookup.
    pub fn is_weak(&self) -> bool {
        !self.is_confident()
    }

    pub fn with_metadata(mut self, entry: CatalogEntry) -> Self {
        self.metadata = Some(entry);
        self
    }

    /// Builds an external-lookup result from the candidate's best recording.
    ///
    /// The message carries the recording's credited artists. Returns `None`
    /// when no recording has a title.
    pub fn from_candidate(candidate: &LookupCandidate) -> Option<Self> {
        let recording = candidate.best_recording()?;
        Some(Self {
            song_name: recording.title.clone(),
            confidence: Some(candidate.score),
            message: Some(recording.artist_names()),
            algorithm_label: None,
            source: MatchSource::ExternalLookup,
            metadata: None,
        })
    }
}

/// Outcome of registering a song with the primary service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResult {
    pub song_name: String,
    #[serde(rename = "hashes", default)]
    pub hash_count: u64,
    #[serde(rename = "fft_impl", default)]
    pub algorithm_label: String,
    #[serde(rename = "fft_details", default, skip_serializing_if = "Option::is_none")]
    pub algorithm_details: Option<String>,
}

// ============================================================================
// External lookup
// ============================================================================

/// One AcoustID match for a submitted fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupCandidate {
    pub id: String,
    /// Match score in `[0, 1]`.
    pub score: f64,
    pub recordings: Vec<Recording>,
}

impl LookupCandidate {
    /// First recording that carries a title.
    pub fn best_recording(&self) -> Option<&Recording> {
        self.recordings
            .iter()
            .find(|recording| !recording.title.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub title: String,
    pub artists: Vec<RecordingArtist>,
}

impl Recording {
    /// Credited artists joined with `", "`, or `"Unknown"`.
    pub fn artist_names(&self) -> String {
        join_names(self.artists.iter().map(|artist| artist.name.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingArtist {
    pub name: String,
}

// ============================================================================
// Catalog metadata
// ============================================================================

/// Catalog metadata attached to a confident match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    /// Empty when the catalog had no artwork.
    pub album_art_url: String,
    /// Passed through as-is; the catalog sends `null` for many tracks.
    pub preview_url: Option<String>,
    pub catalog_url: String,
}

/// Joins non-empty names with `", "`, falling back to [`UNKNOWN`].
pub fn join_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let joined = names
        .into_iter()
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        UNKNOWN.to_string()
    } else {
        joined
    }
}
