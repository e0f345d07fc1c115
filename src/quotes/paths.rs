// Year-based file naming for Quotebank and the derived files.

use std::ffi::OsString;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Years covered by the published Quotebank dumps.
pub const QUOTEBANK_YEARS: RangeInclusive<u16> = 2015..=2020;

/// Raw Quotebank dump for a year, e.g. `quotes-2019.json.bz2`.
pub fn raw_quotes_path(dir: &Path, year: u16) -> PathBuf {
    dir.join(format!("quotes-{year}.json.bz2"))
}

/// Output of the speaker filter, e.g. `quotes-no-nones-2019.json.bz2`.
pub fn filtered_quotes_path(dir: &Path, year: u16) -> PathBuf {
    dir.join(format!("quotes-no-nones-{year}.json.bz2"))
}

/// Output of the enrichment stage, e.g. `quotes-enriched-2019.json.bz2`.
pub fn enriched_quotes_path(dir: &Path, year: u16) -> PathBuf {
    dir.join(format!("quotes-enriched-{year}.json.bz2"))
}

/// Temporary sibling a stage writes into before renaming onto `path`.
///
/// Outputs are only ever checked for existence, so a half-written file
/// must never sit at the final path.
pub fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
