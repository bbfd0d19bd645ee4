use anyhow::{Context, Result};
use colored::Colorize;
use gce_pricing::{
    config::Config,
    normalizer::{self, NormalizeReport},
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute the normalize command
pub fn execute(cfg: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input = input.unwrap_or_else(|| cfg.dataset.raw_path.clone());
    let output = output.unwrap_or_else(|| cfg.dataset.path.clone());

    let report = run(&input, &output)?;

    println!("Extracted data for {} tables.", report.tables.len());
    if !report.skipped.is_empty() {
        println!(
            "{}",
            format!("Skipped {} tables:", report.skipped.len()).yellow()
        );
        for reason in &report.skipped {
            println!("  - {}", reason);
        }
    }
    if report.cell_errors > 0 {
        println!(
            "{}",
            format!("{} price cells could not be decoded", report.cell_errors).yellow()
        );
    }

    Ok(())
}

fn run(input: &Path, output: &Path) -> Result<NormalizeReport> {
    info!(input = %input.display(), "Reading raw pricing tables");
    let raw = normalizer::read_raw_tables(input)
        .with_context(|| format!("Failed to read raw tables from {}", input.display()))?;

    let report = normalizer::normalize_tables(&raw);
    info!(
        normalized = report.tables.len(),
        skipped = report.skipped.len(),
        cell_errors = report.cell_errors,
        "Normalization finished"
    );

    normalizer::write_dataset(output, &report.tables)
        .with_context(|| format!("Failed to write dataset to {}", output.display()))?;

    Ok(report)
}
