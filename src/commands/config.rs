use anyhow::Result;
use colored::Colorize;
use gce_pricing::{catalog::Catalog, config::Config};
use tracing::info;

/// Execute the config show command
pub fn show(cfg: &Config) -> Result<()> {
    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(cfg)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
///
/// The configuration was validated while loading; this also checks that
/// the dataset it points to can be served.
pub fn validate(cfg: &Config) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());

    let catalog = Catalog::load(&cfg.dataset.path, cfg.pricing.effective_regions())?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen Address: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Dataset: {}", cfg.dataset.path.display());
    println!("  Tables: {}", catalog.tables().len());
    println!("  Machine-type Tables: {}", machine_table_count(&catalog));
    println!("  Machine Rows: {}", catalog.machine_row_count());
    println!("  Regions: {}", catalog.regions().len());

    info!("Configuration validation successful");
    Ok(())
}

fn machine_table_count(catalog: &Catalog) -> usize {
    catalog
        .tables()
        .iter()
        .filter(|t| t.is_machine_type_table())
        .count()
}
