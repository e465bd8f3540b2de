// SPDX-License-Identifier: GPL-3.0-or-later

//! Catalog (Spotify Web API) track search.

use crate::error::{CatalogError, Result};
use reqwest::Client;
use serde::Deserialize;
use sonic_domain::{join_names, CatalogEntry, UNKNOWN};
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};
use url::Url;

const CATALOG_API_BASE: &str = "https://api.spotify.com/v1";
const USER_AGENT: &str = concat!("Sonic/", env!("CARGO_PKG_VERSION"));

/// Catalog search client.
///
/// Without a credential the search is still sent, unauthenticated; the
/// catalog's rejection then reads as "no metadata" like any other failure.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    /// Base URL stored without a trailing slash.
    base_url: String,
    credential: Option<String>,
}

impl CatalogClient {
    pub fn new(credential: Option<String>) -> Result<Self> {
        Self::builder().credential(credential).build()
    }

    pub fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::default()
    }

    /// Best catalog entry for a song title, or `None`.
    ///
    /// Never fails: transport errors, error statuses and empty result sets
    /// all come back as `None`.
    pub async fn enrich(&self, song_title: &str) -> Option<CatalogEntry> {
        match self.search_track(song_title).await {
            Ok(entry) => entry,
            Err(err) => {
                warn!(target: "catalog", error = %err, "enrichment degraded to no metadata");
                None
            }
        }
    }

    /// Searches for a single track by free-text title.
    ///
    /// `Ok(None)` means the catalog answered but had no match.
    #[instrument(skip(self), fields(authenticated = self.credential.is_some()))]
    pub async fn search_track(&self, song_title: &str) -> Result<Option<CatalogEntry>> {
        if song_title.trim().is_empty() {
            return Ok(None);
        }

        let url = format!("{}/search", self.base_url);
        debug!(target: "catalog", url = %url, "searching catalog");

        let mut request = self
            .client
            .get(&url)
            .query(&[("q", song_title), ("type", "track"), ("limit", "1")]);
        if let Some(credential) = self.credential.as_deref() {
            request = request.bearer_auth(credential);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(target: "catalog", "response status: {}", status);

        let body = response.text().await?;
        trace!(target: "catalog", "response body: {}", body);

        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let search: SearchResponse = serde_json::from_str(&body)?;
        Ok(search.first_track().map(TrackDto::into_entry))
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    items: Option<Vec<TrackDto>>,
}

#[derive(Debug, Deserialize)]
struct TrackDto {
    id: Option<String>,
    name: Option<String>,
    artists: Option<Vec<NamedDto>>,
    album: Option<AlbumDto>,
    preview_url: Option<String>,
    external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct NamedDto {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumDto {
    name: Option<String>,
    images: Option<Vec<ImageDto>>,
}

#[derive(Debug, Deserialize)]
struct ImageDto {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl SearchResponse {
    fn first_track(self) -> Option<TrackDto> {
        self.tracks?.items?.into_iter().next()
    }
}

impl TrackDto {
    fn into_entry(self) -> CatalogEntry {
        let artists = self.artists.unwrap_or_default();
        let (album, album_art_url) = match self.album {
            Some(album) => (
                album.name.filter(|name| !name.is_empty()),
                album
                    .images
                    .and_then(|images| images.into_iter().next())
                    .and_then(|image| image.url),
            ),
            None => (None, None),
        };

        CatalogEntry {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            artist: join_names(artists.iter().filter_map(|artist| artist.name.as_deref())),
            album: album.unwrap_or_else(|| UNKNOWN.to_string()),
            album_art_url: album_art_url.unwrap_or_default(),
            preview_url: self.preview_url,
            catalog_url: self
                .external_urls
                .and_then(|urls| urls.spotify)
                .unwrap_or_default(),
        }
    }
}

/// Builder for the catalog client.
#[derive(Debug)]
pub struct CatalogClientBuilder {
    base_url: String,
    credential: Option<String>,
    timeout: Option<Duration>,
}

impl Default for CatalogClientBuilder {
    fn default() -> Self {
        Self {
            base_url: CATALOG_API_BASE.to_string(),
            credential: None,
            timeout: None,
        }
    }
}

impl CatalogClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bearer credential; empty strings count as absent.
    pub fn credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential.filter(|credential| !credential.is_empty());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<CatalogClient> {
        Url::parse(&self.base_url).map_err(|e| CatalogError::InvalidBaseUrl(e.to_string()))?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(CatalogClient {
            client: builder.build()?,
            base_url: self.base_url,
            credential: self.credential,
        })
    }
}
