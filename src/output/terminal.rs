// Colored terminal output for stage summaries and lookups.
//
// This module handles all terminal-specific formatting. The main.rs
// command handlers delegate here.

use colored::Colorize;

use crate::attributes::table::{AttributeRow, ID_COLUMN};
use crate::pipeline::enrich::EnrichRun;
use crate::pipeline::filter::YearOutcome;
use crate::quotes::record::Quotation;
use crate::wikidata::labels::LabelReport;

/// Display the per-year results of the filter stage.
pub fn display_filter_summary(outcomes: &[(u16, YearOutcome)]) {
    println!("\n{}", "=== Speaker Filter ===".bold());
    println!();
    println!(
        "  {:>4}  {:>12} {:>12} {:>12} {:>10}",
        "Year".dimmed(),
        "Read".dimmed(),
        "Kept".dimmed(),
        "Unresolved".dimmed(),
        "No QIDs".dimmed(),
    );
    println!("  {}", "-".repeat(56).dimmed());

    for (year, outcome) in outcomes {
        match outcome {
            YearOutcome::Skipped => {
                println!("  {:>4}  {}", year, "already exists, skipped".dimmed());
            }
            YearOutcome::Filtered(stats) => {
                println!(
                    "  {:>4}  {:>12} {:>12} {:>12} {:>10}",
                    year,
                    stats.read,
                    stats.kept.to_string().green(),
                    stats.dropped_unresolved,
                    stats.dropped_no_qids,
                );
            }
        }
    }
    println!();
}

/// Display counters and unresolved identifiers of an enrichment pass.
pub fn display_enrich_summary(year: u16, run: &EnrichRun) {
    let stats = &run.stats;
    println!(
        "\n{}",
        format!("=== Enrichment {year} ({} quotations) ===", stats.records).bold()
    );
    println!();
    println!(
        "  {:<18} {:>10} {:>10} {:>12}",
        "Column".dimmed(),
        "Assigned".dimmed(),
        "Absent".dimmed(),
        "No speaker".dimmed(),
    );
    println!("  {}", "-".repeat(54).dimmed());
    for (column, counts) in &stats.columns {
        println!(
            "  {:<18} {:>10} {:>10} {:>12}",
            column, counts.assigned, counts.absent, counts.no_speaker_row
        );
    }

    if stats.skipped.is_empty() {
        println!("\n  {} every label resolved", "ok".green());
    } else {
        println!(
            "\n  {} {} identifiers unresolved ({} labels left out)",
            "!".yellow(),
            stats.skipped.len(),
            stats.skipped_lookups
        );
        for (id, reason) in &stats.skipped {
            println!("    {:<12} {}", id, super::truncate_chars(reason, 100).dimmed());
        }
    }
    println!();
}

/// Display the first enriched quotations with their added columns.
pub fn display_preview(quotes: &[Quotation], columns: &[&str]) {
    if quotes.is_empty() {
        return;
    }

    println!("{}", format!("=== Preview ({} quotations) ===", quotes.len()).bold());
    for quote in quotes {
        let text = quote
            .get("quotation")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        println!(
            "\n  {} \"{}\"",
            quote.speaker().unwrap_or("?").bold(),
            super::truncate_chars(text, 100).dimmed()
        );
        for column in columns {
            let value = match quote.string_list(column) {
                Some(values) if !values.is_empty() => values.join(", "),
                _ => "-".dimmed().to_string(),
            };
            println!("    {:<18} {}", column, value);
        }
    }
    println!();
}

/// Display the outcome of a label lookup.
pub fn display_label_report(ids: &[String], report: &LabelReport) {
    println!(
        "\n{}",
        format!(
            "=== Labels ({} resolved, {} skipped) ===",
            report.resolved(),
            report.skipped.len()
        )
        .bold()
    );
    for id in ids {
        if let Some(label) = report.label(id) {
            println!("  {:<12} {}", id, label.green());
        }
    }
    for skip in &report.skipped {
        println!("  {:<12} {} {}", skip.id, "skipped".red(), skip.reason.dimmed());
    }
    println!();
}

/// Display one speaker's attribute row.
pub fn display_speaker(speaker_id: &str, candidates: &[String], row: Option<&AttributeRow>) {
    println!("\n{}", format!("=== Speaker {speaker_id} ===").bold());
    if candidates.len() > 1 {
        println!(
            "  Chosen from {} candidates: {}",
            candidates.len(),
            candidates.join(", ").dimmed()
        );
    }

    let Some(row) = row else {
        println!("  {}", "No row in the speaker attributes table".yellow());
        return;
    };

    let mut columns: Vec<_> = row.iter().filter(|(c, _)| *c != ID_COLUMN).collect();
    columns.sort_by(|a, b| a.0.cmp(b.0));
    for (column, values) in columns {
        println!("  {:<18} {}", column, values.join(", "));
    }
    println!();
}
