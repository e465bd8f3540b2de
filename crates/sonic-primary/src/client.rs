// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{PrimaryError, Result};
use crate::transport::Transport;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde::de::IgnoredAny;
use serde::Deserialize;
use sonic_domain::{AudioAsset, MatchResult, MatchSource, RegistrationResult};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const USER_AGENT: &str = concat!("Sonic/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SongsResponse {
    #[serde(default)]
    songs: Option<Vec<String>>,
}

/// Client for the primary fingerprint-matching service.
///
/// Registration and recognition each come in a standard and a custom
/// algorithm variant; the variant only changes the endpoint path.
#[derive(Debug, Clone)]
pub struct PrimaryClient {
    transport: Transport,
    base_url: Url,
}

impl PrimaryClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> PrimaryClientBuilder {
        PrimaryClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Register a song from an audio file.
    ///
    /// # Arguments
    /// * `asset` - Audio payload, uploaded as the `file` part.
    /// * `name` - Song name, sent as the `name` field.
    /// * `use_custom_algorithm` - Target `/fingerprint/custom` instead of `/fingerprint`.
    #[instrument(skip(self, asset), fields(file = asset.file_name(), bytes = asset.len()))]
    pub async fn register(
        &self,
        asset: &AudioAsset,
        name: &str,
        use_custom_algorithm: bool,
    ) -> Result<RegistrationResult> {
        let url = self.endpoint(&variant("fingerprint", use_custom_algorithm))?;
        let form = upload(asset).text("name", name.to_string());

        let result: RegistrationResult = self.transport.call(Method::POST, url, Some(form)).await?;
        debug!(
            target: "primary",
            song = %result.song_name,
            hashes = result.hash_count,
            algorithm = %result.algorithm_label,
            "song registered"
        );
        Ok(result)
    }

    /// Recognize an audio file against the registered corpus.
    ///
    /// The result never carries catalog metadata; enrichment belongs to the
    /// orchestrator.
    #[instrument(skip(self, asset), fields(file = asset.file_name(), bytes = asset.len()))]
    pub async fn recognize(
        &self,
        asset: &AudioAsset,
        use_custom_algorithm: bool,
    ) -> Result<MatchResult> {
        let url = self.endpoint(&variant("recognize", use_custom_algorithm))?;

        let mut result: MatchResult = self
            .transport
            .call(Method::POST, url, Some(upload(asset)))
            .await?;
        result.source = MatchSource::Local;
        result.metadata = None;

        debug!(
            target: "primary",
            song = %result.song_name,
            confidence = ?result.confidence,
            "recognition finished"
        );
        Ok(result)
    }

    /// Names of every registered song, fetched fresh on each call.
    pub async fn list_songs(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["songs"])?;
        let response: SongsResponse = self.transport.call(Method::GET, url, None).await?;
        Ok(response.songs.unwrap_or_default())
    }

    /// Delete a registered song by name.
    #[instrument(skip(self))]
    pub async fn delete_song(&self, name: &str) -> Result<()> {
        let url = self.endpoint(&["fingerprint", name])?;
        let _: IgnoredAny = self.transport.call(Method::DELETE, url, None).await?;
        debug!(target: "primary", song = name, "song deleted");
        Ok(())
    }

    /// Liveness probe; any failure reads as unhealthy.
    pub async fn check_health(&self) -> bool {
        let url = match self.endpoint(&["health"]) {
            Ok(url) => url,
            Err(err) => {
                warn!(target: "primary", error = %err, "health endpoint unavailable");
                return false;
            }
        };

        match self.transport.probe(url).await {
            Ok(status) => status.is_success(),
            Err(err) => {
                warn!(target: "primary", error = %err, "health probe failed");
                false
            }
        }
    }

    /// Appends path segments to the base URL, percent-encoding each once.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PrimaryError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn variant(operation: &'static str, use_custom_algorithm: bool) -> Vec<&'static str> {
    if use_custom_algorithm {
        vec![operation, "custom"]
    } else {
        vec![operation]
    }
}

fn upload(asset: &AudioAsset) -> Form {
    let part = Part::bytes(asset.bytes().to_vec()).file_name(asset.file_name().to_string());
    Form::new().part("file", part)
}

/// Builder for the primary service client.
#[derive(Debug)]
pub struct PrimaryClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl PrimaryClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Set a request timeout. Without one the transport default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot carry path segments or the
    /// HTTP client cannot be created.
    pub fn build(self) -> Result<PrimaryClient> {
        let base_url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| PrimaryError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PrimaryError::InvalidBaseUrl(self.base_url));
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(PrimaryClient {
            transport: Transport::new(builder.build()?),
            base_url,
        })
    }
}
