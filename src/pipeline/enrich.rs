// Enrichment stage.
//
// Reads a filtered year file, adds the plan's speaker attribute columns to
// every quotation, and writes `quotes-enriched-<year>.json.bz2`. Label
// lookups that fail are collected into the run's stats instead of being
// printed and forgotten.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use crate::attributes::table::AttributeTable;
use crate::enrich::column::EnrichOutcome;
use crate::enrich::plan::{enrich_columns, ColumnPlan};
use crate::quotes::codec::{JsonLinesReader, JsonLinesWriter};
use crate::quotes::paths::{enriched_quotes_path, filtered_quotes_path, part_path};
use crate::quotes::record::Quotation;
use crate::wikidata::traits::LabelResolver;

/// Per-column outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnStats {
    pub assigned: u64,
    pub absent: u64,
    pub no_speaker_row: u64,
}

/// Counters and partial-failure report for one enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichStats {
    pub records: u64,
    pub columns: BTreeMap<String, ColumnStats>,
    /// Identifiers whose labels could not be resolved, with the last reason seen.
    pub skipped: BTreeMap<String, String>,
    /// How many times a label was left out because of a skipped identifier.
    pub skipped_lookups: u64,
}

impl EnrichStats {
    fn record(&mut self, outcomes: Vec<(String, EnrichOutcome)>) {
        self.records += 1;
        for (column, outcome) in outcomes {
            let stats = self.columns.entry(column).or_default();
            match outcome {
                EnrichOutcome::Assigned { skipped, .. } => {
                    stats.assigned += 1;
                    self.skipped_lookups += skipped.len() as u64;
                    for skip in skipped {
                        self.skipped.insert(skip.id, skip.reason);
                    }
                }
                EnrichOutcome::Absent => stats.absent += 1,
                EnrichOutcome::NoSpeakerRow { .. } => stats.no_speaker_row += 1,
            }
        }
    }
}

/// An enrichment pass: its stats plus the first few enriched quotations.
#[derive(Debug, Clone, Default)]
pub struct EnrichRun {
    pub stats: EnrichStats,
    pub preview: Vec<Quotation>,
}

/// Settings for one enrichment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichSettings {
    /// Stop after this many quotations.
    pub limit: Option<u64>,
    /// Keep this many enriched quotations for display.
    pub preview: usize,
    /// Overwrite fields a quotation already carries.
    pub ignore_existing: bool,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            limit: None,
            preview: 10,
            ignore_existing: true,
        }
    }
}

/// Enrich every quotation from `reader` and write it to `writer`.
///
/// The plan is validated against the table before the first record. The
/// writer is not finished here.
#[allow(clippy::too_many_arguments)]
pub async fn enrich_quotations<R: BufRead, W: Write>(
    reader: JsonLinesReader<R>,
    writer: &mut JsonLinesWriter<W>,
    plan: &ColumnPlan,
    table: &AttributeTable,
    resolver: &dyn LabelResolver,
    settings: EnrichSettings,
    progress: &ProgressBar,
) -> Result<EnrichRun> {
    plan.validate(table)?;

    let mut run = EnrichRun::default();

    for quote in reader {
        if settings.limit.is_some_and(|limit| run.stats.records >= limit) {
            break;
        }

        let mut quote = quote?;
        let outcomes = enrich_columns(&mut quote, plan, table, resolver, settings.ignore_existing)
            .await
            .with_context(|| format!("Failed to enrich quotation #{}", run.stats.records + 1))?;
        run.stats.record(outcomes);

        writer.write(&quote)?;
        if run.preview.len() < settings.preview {
            run.preview.push(quote);
        }

        if run.stats.records % 1_000 == 0 {
            progress.set_message(format!("{} quotations enriched", run.stats.records));
            progress.tick();
        }
    }

    if !run.stats.skipped.is_empty() {
        warn!(
            identifiers = run.stats.skipped.len(),
            lookups = run.stats.skipped_lookups,
            "Some labels could not be resolved"
        );
    }

    Ok(run)
}

/// Enrich one file into another through a `.part` file.
pub async fn enrich_file(
    input: &Path,
    output: &Path,
    plan: &ColumnPlan,
    table: &AttributeTable,
    resolver: &dyn LabelResolver,
    settings: EnrichSettings,
) -> Result<EnrichRun> {
    let reader = JsonLinesReader::open(input)?;
    let partial = part_path(output);
    let mut writer = JsonLinesWriter::create(&partial, output)?;

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg}")?);

    let run =
        enrich_quotations(reader, &mut writer, plan, table, resolver, settings, &progress).await?;
    writer.finish()?;
    progress.finish_and_clear();

    fs::rename(&partial, output).with_context(|| {
        format!(
            "Failed to move {} into place at {}",
            partial.display(),
            output.display()
        )
    })?;

    Ok(run)
}

/// Enrich the filtered file of `year` in `dir`.
///
/// Returns `None` when the enriched file already exists and `force` is off.
pub async fn run_year(
    dir: &Path,
    year: u16,
    plan: &ColumnPlan,
    table: &AttributeTable,
    resolver: &dyn LabelResolver,
    settings: EnrichSettings,
    force: bool,
) -> Result<Option<EnrichRun>> {
    let input = filtered_quotes_path(dir, year);
    let output = enriched_quotes_path(dir, year);

    if output.exists() && !force {
        info!(year = year, path = %output.display(), "Output already exists, skipping");
        return Ok(None);
    }
    if !input.exists() {
        anyhow::bail!(
            "Filtered quotations for {year} not found at {}. Run `quotescope filter` first.",
            input.display()
        );
    }

    info!(year = year, input = %input.display(), columns = plan.len(), "Enriching quotations");
    let run = enrich_file(&input, &output, plan, table, resolver, settings).await?;
    info!(
        year = year,
        records = run.stats.records,
        skipped_ids = run.stats.skipped.len(),
        "Year enriched"
    );
    Ok(Some(run))
}
