use anyhow::Result;
use colored::Colorize;
use gce_pricing::{catalog::Catalog, config::Config};

/// Execute the cost command
///
/// Prints the price of the first machine type with the given shape in
/// `region`; a miss is reported as an error.
pub fn execute(cfg: &Config, cpus: u32, memory: u32, region: &str) -> Result<()> {
    let catalog = Catalog::load(&cfg.dataset.path, cfg.pricing.effective_regions())?;

    let quote = catalog.cost(cpus, memory, region)?;
    println!(
        "The cost for machine type '{}' with {} CPUs, {}GB memory in region '{}' is {} USD.",
        quote.machine_type.bold(),
        quote.cpus,
        quote.memory_gb,
        quote.region,
        quote.cost.to_string().green()
    );

    Ok(())
}
