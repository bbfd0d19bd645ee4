use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::regions::default_regions;
use crate::server::API_ROUTES;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub pricing: PricingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Canonical dataset written by `normalize` and loaded by `serve`
    pub path: PathBuf,
    /// Raw table descriptors read by `normalize`
    pub raw_path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("structured_pricing_data.json"),
            raw_path: PathBuf::from("raw_pricing_tables.json"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Regions scanned by multi-region queries; empty means the built-in list
    pub regions: Vec<String>,
}

impl PricingConfig {
    pub fn effective_regions(&self) -> Vec<String> {
        if self.regions.is_empty() {
            default_regions()
        } else {
            self.regions.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

/// Load configuration from an optional TOML file plus `GCE_PRICING__*`
/// environment overrides
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("GCE_PRICING").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Check a configuration, including one modified after loading
pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}': expected 'text' or 'json'", other),
    }

    if cfg.dataset.path.as_os_str().is_empty() {
        anyhow::bail!("Dataset path cannot be empty");
    }

    if cfg.dataset.raw_path.as_os_str().is_empty() {
        anyhow::bail!("Raw dataset path cannot be empty");
    }

    if cfg.pricing.regions.iter().any(|r| r.trim().is_empty()) {
        anyhow::bail!("Region codes cannot be empty");
    }

    if cfg.metrics.enabled {
        validate_metrics_endpoint(&cfg.metrics.endpoint)?;
    }

    Ok(())
}

fn validate_metrics_endpoint(endpoint: &str) -> anyhow::Result<()> {
    if !endpoint.starts_with('/') {
        anyhow::bail!("Metrics endpoint '{}' must start with '/'", endpoint);
    }

    // Captures would shadow API routes
    if endpoint.contains([':', '*']) {
        anyhow::bail!("Metrics endpoint '{}' must be a static path", endpoint);
    }

    if API_ROUTES.contains(&endpoint) {
        anyhow::bail!(
            "Metrics endpoint '{}' collides with an API route",
            endpoint
        );
    }

    Ok(())
}
