// Speaker filter stage.
//
// Reads a year of raw Quotebank, drops quotations whose speaker could not
// be attributed, and writes the rest to `quotes-no-nones-<year>.json.bz2`.
// Years whose output already exists are skipped, so an interrupted run
// can simply be started again.

use std::fs;
use std::io::{BufRead, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use crate::quotes::codec::{JsonLinesReader, JsonLinesWriter};
use crate::quotes::paths::{filtered_quotes_path, part_path, raw_quotes_path};
use crate::quotes::record::Quotation;

/// Which quotations count as having no usable speaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Drop quotations whose `speaker` is the `"None"` sentinel.
    #[default]
    SpeakerSentinel,
    /// Also drop quotations with a missing or empty `qids` list, which
    /// would otherwise fail disambiguation during enrichment.
    SpeakerOrEmptyQids,
}

/// Why a quotation was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnresolvedSpeaker,
    NoQids,
}

impl FilterPolicy {
    /// `None` keeps the quotation.
    pub fn drop_reason(&self, quote: &Quotation) -> Option<DropReason> {
        if quote.is_speaker_unresolved() {
            return Some(DropReason::UnresolvedSpeaker);
        }
        match self {
            FilterPolicy::SpeakerOrEmptyQids if !quote.has_qids() => Some(DropReason::NoQids),
            _ => None,
        }
    }
}

/// Counters for one filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub read: u64,
    pub kept: u64,
    pub dropped_unresolved: u64,
    pub dropped_no_qids: u64,
}

impl FilterStats {
    pub fn dropped(&self) -> u64 {
        self.dropped_unresolved + self.dropped_no_qids
    }
}

/// Result of the filter stage for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearOutcome {
    /// Output already existed; nothing was read.
    Skipped,
    Filtered(FilterStats),
}

/// Stream quotations from `reader` to `writer`, dropping per `policy`.
///
/// Kept quotations are written in input order and unmodified. The first
/// malformed line aborts the pass. The writer is not finished here.
pub fn filter_quotations<R: BufRead, W: Write>(
    reader: JsonLinesReader<R>,
    writer: &mut JsonLinesWriter<W>,
    policy: FilterPolicy,
    progress: &ProgressBar,
) -> Result<FilterStats> {
    let mut stats = FilterStats::default();

    for quote in reader {
        let quote = quote?;
        stats.read += 1;

        match policy.drop_reason(&quote) {
            Some(DropReason::UnresolvedSpeaker) => stats.dropped_unresolved += 1,
            Some(DropReason::NoQids) => stats.dropped_no_qids += 1,
            None => {
                writer.write(&quote)?;
                stats.kept += 1;
            }
        }

        if stats.read % 100_000 == 0 {
            progress.set_message(format!("{} read, {} kept", stats.read, stats.kept));
            progress.tick();
        }
    }

    Ok(stats)
}

/// Filter one file into another, writing through a `.part` file that is
/// renamed onto `output` only once the stream is complete.
pub fn filter_file(input: &Path, output: &Path, policy: FilterPolicy) -> Result<FilterStats> {
    let reader = JsonLinesReader::open(input)?;
    let partial = part_path(output);
    let mut writer = JsonLinesWriter::create(&partial, output)?;

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg}")?);

    let stats = filter_quotations(reader, &mut writer, policy, &progress)?;
    writer.finish()?;
    progress.finish_and_clear();

    fs::rename(&partial, output).with_context(|| {
        format!(
            "Failed to move {} into place at {}",
            partial.display(),
            output.display()
        )
    })?;

    Ok(stats)
}

/// Run the filter stage for every year in `years`.
///
/// Input is `<input_dir>/quotes-<year>.json.bz2`, output goes to
/// `<output_dir>/quotes-no-nones-<year>.json.bz2`. A year whose output
/// already exists is skipped without looking at its content.
pub fn run_years(
    input_dir: &Path,
    output_dir: &Path,
    years: RangeInclusive<u16>,
    policy: FilterPolicy,
) -> Result<Vec<(u16, YearOutcome)>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut outcomes = Vec::new();
    for year in years {
        let input = raw_quotes_path(input_dir, year);
        let output = filtered_quotes_path(output_dir, year);

        if output.exists() {
            info!(year = year, path = %output.display(), "Output already exists, skipping");
            outcomes.push((year, YearOutcome::Skipped));
            continue;
        }

        if !input.exists() {
            anyhow::bail!("Quotebank file for {year} not found at {}", input.display());
        }

        info!(year = year, input = %input.display(), "Extracting quotations with a resolved speaker");
        let stats = filter_file(&input, &output, policy)?;
        info!(
            year = year,
            read = stats.read,
            kept = stats.kept,
            dropped = stats.dropped(),
            "Year filtered"
        );
        outcomes.push((year, YearOutcome::Filtered(stats)));
    }

    Ok(outcomes)
}
