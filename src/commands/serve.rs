use anyhow::{Context, Result};
use colored::Colorize;
use gce_pricing::{
    catalog::Catalog,
    config::{validate_config, Config},
    server,
};
use std::path::PathBuf;
use tracing::info;

/// Execute the serve command
///
/// The dataset is loaded before binding; a missing or malformed file stops
/// startup.
pub async fn execute(cfg: Config, dataset: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let cfg = apply_overrides(cfg, dataset, port)?;

    println!("{}", "Starting pricing API...".green());

    let catalog = Catalog::load(&cfg.dataset.path, cfg.pricing.effective_regions())
        .context("Cannot start without a pricing dataset; run `gce-pricing normalize` first")?;

    info!(
        dataset = %cfg.dataset.path.display(),
        "Pricing dataset loaded"
    );

    server::start_server(cfg, catalog).await
}

/// Apply command-line overrides and validate the result again
fn apply_overrides(mut cfg: Config, dataset: Option<PathBuf>, port: Option<u16>) -> Result<Config> {
    if let Some(path) = dataset {
        cfg.dataset.path = path;
    }
    if let Some(port) = port {
        cfg.server.port = port;
    }

    validate_config(&cfg).context("Invalid command-line override")?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_configured_values() {
        let cfg = apply_overrides(
            Config::default(),
            Some(PathBuf::from("snapshot.json")),
            Some(9000),
        )
        .unwrap();

        assert_eq!(cfg.dataset.path, PathBuf::from("snapshot.json"));
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn test_overrides_are_validated() {
        assert!(apply_overrides(Config::default(), None, Some(0)).is_err());
        assert!(apply_overrides(Config::default(), Some(PathBuf::new()), None).is_err());
    }
}
