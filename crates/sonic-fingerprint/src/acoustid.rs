// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{FingerprintError, Result};
use crate::fingerprint::Fingerprint;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use sonic_domain::{LookupCandidate, Recording, RecordingArtist};
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};
use url::Url;

const ACOUSTID_API_BASE: &str = "https://api.acoustid.org/v2";
const LOOKUP_META: &str = "recordings releasegroups compress";
const USER_AGENT: &str = concat!("Sonic/", env!("CARGO_PKG_VERSION"));

/// AcoustID API client for fingerprint lookup.
///
/// Lookups are best effort: [`AcoustidClient::lookup`] never fails, it
/// returns no candidates instead.
#[derive(Debug, Clone)]
pub struct AcoustidClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AcoustidClient {
    /// Create a new AcoustID client.
    ///
    /// # Arguments
    /// * `api_key` - AcoustID application key sent as the `client` parameter.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> AcoustidClientBuilder {
        AcoustidClientBuilder::new(api_key)
    }

    /// Lookup a fingerprint and return every candidate AcoustID reports.
    ///
    /// # Example
    /// ```no_run
    /// # use sonic_fingerprint::AcoustidClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = AcoustidClient::new("your-api-key")?;
    /// let candidates = client.lookup("AQADtEmUaEkSRZEGAR", 212).await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn lookup(&self, fingerprint: &str, duration_seconds: u32) -> Vec<LookupCandidate> {
        self.lookup_fingerprint(&Fingerprint::new(fingerprint, duration_seconds))
            .await
    }

    /// Typed form of [`AcoustidClient::lookup`].
    pub async fn lookup_fingerprint(&self, fingerprint: &Fingerprint) -> Vec<LookupCandidate> {
        match self.try_lookup(fingerprint).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(target: "acoustid", error = %err, "lookup degraded to no candidates");
                Vec::new()
            }
        }
    }

    /// Fallible lookup, for callers that want to know why nothing came back.
    #[instrument(skip(self, fingerprint), fields(duration = fingerprint.duration))]
    pub async fn try_lookup(&self, fingerprint: &Fingerprint) -> Result<Vec<LookupCandidate>> {
        fingerprint.validate()?;

        let mut url = Url::parse(&format!("{}/lookup", self.base_url))
            .map_err(|e| FingerprintError::InvalidBaseUrl(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("client", &self.api_key)
            .append_pair("fingerprint", &fingerprint.hash)
            .append_pair("duration", &fingerprint.duration.to_string())
            .append_pair("meta", LOOKUP_META);

        trace!(target: "acoustid", "lookup: {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        debug!(target: "acoustid", "response status: {}", status);

        let body = response.text().await?;
        trace!(target: "acoustid", "response: {}", body);

        if !status.is_success() {
            return Err(FingerprintError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let response: LookupResponse = serde_json::from_str(&body)?;
        let candidates = response.into_candidates()?;
        debug!(target: "acoustid", candidates = candidates.len(), "lookup finished");
        Ok(candidates)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: Option<String>,
    results: Option<Vec<CandidateDto>>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CandidateDto {
    id: Option<String>,
    score: Option<f64>,
    recordings: Option<Vec<RecordingDto>>,
}

#[derive(Debug, Deserialize)]
struct RecordingDto {
    id: Option<String>,
    title: Option<String>,
    artists: Option<Vec<ArtistDto>>,
}

#[derive(Debug, Deserialize)]
struct ArtistDto {
    name: Option<String>,
}

impl LookupResponse {
    fn into_candidates(self) -> Result<Vec<LookupCandidate>> {
        let status = self.status.unwrap_or_default();
        if status != "ok" {
            let message = self
                .error
                .as_ref()
                .and_then(|error| error.get("message").or(Some(error)))
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            return Err(FingerprintError::LookupStatus { status, message });
        }

        let results = self.results.ok_or(FingerprintError::MissingResults)?;
        Ok(results.into_iter().map(CandidateDto::into_candidate).collect())
    }
}

impl CandidateDto {
    fn into_candidate(self) -> LookupCandidate {
        LookupCandidate {
            id: self.id.unwrap_or_default(),
            score: self.score.unwrap_or(0.0).clamp(0.0, 1.0),
            recordings: self
                .recordings
                .unwrap_or_default()
                .into_iter()
                .map(RecordingDto::into_recording)
                .collect(),
        }
    }
}

impl RecordingDto {
    fn into_recording(self) -> Recording {
        Recording {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            artists: self
                .artists
                .unwrap_or_default()
                .into_iter()
                .filter_map(|artist| artist.name)
                .map(|name| RecordingArtist { name })
                .collect(),
        }
    }
}

/// Builder for AcoustID client.
#[derive(Debug)]
pub struct AcoustidClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl AcoustidClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ACOUSTID_API_BASE.to_string(),
            timeout: None,
        }
    }

    /// Set a custom base URL (useful for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the AcoustID client.
    ///
    /// # Errors
    /// Returns an error if the base URL is not a valid URL or the HTTP
    /// client cannot be created.
    pub fn build(self) -> Result<AcoustidClient> {
        Url::parse(&self.base_url)
            .map_err(|e| FingerprintError::InvalidBaseUrl(e.to_string()))?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(AcoustidClient {
            client: builder.build()?,
            base_url: self.base_url,
            api_key: self.api_key,
        })
    }
}
