// Pipeline status display — which year files exist at each stage.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;

use crate::config::Config;
use crate::quotes::paths::{
    enriched_quotes_path, filtered_quotes_path, raw_quotes_path, QUOTEBANK_YEARS,
};

/// Display pipeline status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    println!("Input directory:  {}", config.input_dir.display());
    println!("Output directory: {}", config.output_dir.display());
    match &config.attributes_path {
        Some(path) if path.exists() => println!("Speaker attributes: {}", path.display()),
        Some(path) => println!(
            "Speaker attributes: {} ({})",
            path.display(),
            "missing".red()
        ),
        None => println!("Speaker attributes: not configured (set SPEAKER_ATTRIBUTES_PATH)"),
    }
    println!("Wikidata: {} ({})", config.wikidata_url, config.wikidata_language);

    for year in QUOTEBANK_YEARS {
        println!("\n{}", year.to_string().bold());
        println!(
            "  raw       {}",
            describe(&raw_quotes_path(&config.input_dir, year))
        );
        println!(
            "  filtered  {}",
            describe(&filtered_quotes_path(&config.output_dir, year))
        );
        println!(
            "  enriched  {}",
            describe(&enriched_quotes_path(&config.output_dir, year))
        );
    }

    Ok(())
}

fn describe(path: &Path) -> String {
    let Ok(meta) = std::fs::metadata(path) else {
        return "-".dimmed().to_string();
    };
    let modified = meta
        .modified()
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{} ({}, {})", path.display(), format_bytes(meta.len()), modified)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
