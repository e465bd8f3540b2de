// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_PRIMARY_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_ACOUSTID_BASE_URL: &str = "https://api.acoustid.org/v2";
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://api.spotify.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryConfig {
    pub base_url: String,
    /// Per-request timeout; unset leaves the transport default in place.
    pub timeout_secs: Option<u64>,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PRIMARY_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_ACOUSTID_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Bearer credential; without it the search is still sent unauthenticated.
    pub client_credential: Option<String>,
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_credential: None,
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub primary: PrimaryConfig,
    pub lookup: LookupConfig,
    pub catalog: CatalogConfig,
    pub telemetry: TelemetryConfig,
}

/// Layered providers: defaults, optional TOML file, then `SONIC_` environment overrides.
pub fn figment(config_path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment.merge(Env::prefixed("SONIC_").split("__"))
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: SONIC_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let config: AppConfig = figment(config_path).extract()?;
    info!(
        target: "config",
        primary = %config.primary.base_url,
        catalog_authenticated = config.catalog.client_credential.is_some(),
        "configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_public_services() {
        let config = AppConfig::default();
        assert_eq!(config.primary.base_url, DEFAULT_PRIMARY_BASE_URL);
        assert_eq!(config.lookup.base_url, DEFAULT_ACOUSTID_BASE_URL);
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_BASE_URL);
        assert!(config.catalog.client_credential.is_none());
        assert!(config.primary.timeout_secs.is_none());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sonic.toml",
                r#"
                [primary]
                base_url = "http://fingerprints.internal:9000"
                timeout_secs = 15

                [lookup]
                api_key = "file-key"
                "#,
            )?;

            let config = load(Some(Path::new("sonic.toml"))).expect("config loads");
            assert_eq!(config.primary.base_url, "http://fingerprints.internal:9000");
            assert_eq!(config.primary.timeout_secs, Some(15));
            assert_eq!(config.lookup.api_key, "file-key");
            assert_eq!(config.lookup.base_url, DEFAULT_ACOUSTID_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sonic.toml",
                r#"
                [lookup]
                api_key = "file-key"
                "#,
            )?;
            jail.set_env("SONIC_LOOKUP__API_KEY", "env-key");
            jail.set_env("SONIC_CATALOG__CLIENT_CREDENTIAL", "token-123");

            let config = load(Some(Path::new("sonic.toml"))).expect("config loads");
            assert_eq!(config.lookup.api_key, "env-key");
            assert_eq!(config.catalog.client_credential.as_deref(), Some("token-123"));
            Ok(())
        });
    }
}
