// Composition tests — the two stages chained over real files.
//
// These tests exercise the data flow between modules:
//   raw year file -> speaker filter -> filtered file -> enrichment -> enriched file
// using bzip2 fixtures in a temp dir and a fixed-map label resolver.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use indicatif::ProgressBar;
use serde_json::json;

use quotescope::attributes::table::{AttributeRow, AttributeTable};
use quotescope::enrich::plan::ColumnPlan;
use quotescope::pipeline::enrich::{enrich_quotations, run_year, EnrichSettings};
use quotescope::pipeline::filter::{filter_quotations, run_years, FilterPolicy, YearOutcome};
use quotescope::quotes::codec::{Compression, JsonLinesReader, JsonLinesWriter};
use quotescope::quotes::paths::{enriched_quotes_path, filtered_quotes_path, raw_quotes_path};
use quotescope::quotes::record::Quotation;
use quotescope::wikidata::traits::LabelResolver;

struct MapResolver(HashMap<&'static str, &'static str>);

#[async_trait]
impl LabelResolver for MapResolver {
    async fn resolve_label(&self, id: &str) -> Result<String> {
        match self.0.get(id) {
            Some(label) => Ok(label.to_string()),
            None => anyhow::bail!("no such entity: {id}"),
        }
    }
}

fn resolver() -> MapResolver {
    MapResolver(HashMap::from([
        ("Q6581097", "male"),
        ("Q6581072", "female"),
        ("Q145", "United Kingdom"),
    ]))
}

fn quotations() -> Vec<Quotation> {
    [
        json!({"quoteID": "2019-01-01-000001", "quotation": "Don't panic.", "speaker": "Douglas Adams",
               "qids": ["Q42", "Q5"], "numOccurrences": 3, "probas": [["Douglas Adams", "0.91"], ["None", "0.09"]]}),
        json!({"quoteID": "2019-01-01-000002", "quotation": "Who said this?", "speaker": "None",
               "qids": [], "numOccurrences": 1, "probas": [["None", "0.77"]]}),
        json!({"quoteID": "2019-01-01-000003", "quotation": "Science is a way of thinking.", "speaker": "Carl Sagan",
               "qids": ["Q410"], "numOccurrences": 2, "probas": [["Carl Sagan", "0.88"]]}),
        json!({"quoteID": "2019-01-01-000004", "quotation": "An orphan.", "speaker": "Somebody",
               "qids": [], "numOccurrences": 1, "probas": [["Somebody", "0.51"]]}),
    ]
    .into_iter()
    .map(|v| serde_json::from_value(v).unwrap())
    .collect()
}

fn write_file(path: &Path, quotes: &[Quotation]) {
    let mut writer = JsonLinesWriter::create(path, path).unwrap();
    for q in quotes {
        writer.write(q).unwrap();
    }
    writer.finish().unwrap();
}

fn read_file(path: &Path) -> Vec<Quotation> {
    JsonLinesReader::open(path)
        .unwrap()
        .map(|q| q.unwrap())
        .collect()
}

fn table() -> AttributeTable {
    let mut table = AttributeTable::new(["id", "gender", "nationality", "date_of_birth"]);
    let row = |cells: &[(&str, &str)]| -> AttributeRow {
        cells
            .iter()
            .map(|(c, v)| (c.to_string(), vec![v.to_string()]))
            .collect()
    };
    table.insert_row("Q5", row(&[("gender", "Q6581097"), ("nationality", "Q145")]));
    table.insert_row("Q410", row(&[("gender", "Q6581097"), ("date_of_birth", "+1934-11-09T00:00:00Z")]));
    table
}

// ============================================================
// Filter stage
// ============================================================

#[test]
fn filter_drops_sentinel_and_preserves_order_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let raw = raw_quotes_path(dir.path(), 2019);
    let out_dir = dir.path().join("out");
    write_file(&raw, &quotations());

    let outcomes = run_years(dir.path(), &out_dir, 2019..=2019, FilterPolicy::default()).unwrap();
    match outcomes.as_slice() {
        [(2019, YearOutcome::Filtered(stats))] => {
            assert_eq!(stats.read, 4);
            assert_eq!(stats.kept, 3);
            assert_eq!(stats.dropped_unresolved, 1);
            assert_eq!(stats.dropped_no_qids, 0);
        }
        other => panic!("unexpected outcomes: {other:?}"),
    }

    let kept = read_file(&filtered_quotes_path(&out_dir, 2019));
    let expected: Vec<Quotation> = quotations()
        .into_iter()
        .filter(|q| !q.is_speaker_unresolved())
        .collect();
    // Exact equality: no field lost, order of records kept
    assert_eq!(kept, expected);
}

#[test]
fn filtered_output_is_byte_identical_per_line() {
    let input = quotations();
    let mut raw = JsonLinesWriter::new(Vec::new(), Compression::Plain);
    for q in &input {
        raw.write(q).unwrap();
    }
    let raw = raw.finish().unwrap();

    let mut out = JsonLinesWriter::new(Vec::new(), Compression::Plain);
    filter_quotations(
        JsonLinesReader::new(Cursor::new(raw.clone()), "mem"),
        &mut out,
        FilterPolicy::SpeakerSentinel,
        &ProgressBar::hidden(),
    )
    .unwrap();
    let out = String::from_utf8(out.finish().unwrap()).unwrap();

    let raw = String::from_utf8(raw).unwrap();
    let expected: Vec<&str> = raw.lines().filter(|l| !l.contains(r#""speaker":"None""#)).collect();
    assert_eq!(out.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn require_qids_policy_also_drops_empty_identifier_sets() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&raw_quotes_path(dir.path(), 2020), &quotations());

    let outcomes =
        run_years(dir.path(), dir.path(), 2020..=2020, FilterPolicy::SpeakerOrEmptyQids).unwrap();
    let [(_, YearOutcome::Filtered(stats))] = outcomes.as_slice() else {
        panic!("expected one filtered year");
    };
    assert_eq!(stats.kept, 2);
    assert_eq!(stats.dropped_unresolved, 1);
    assert_eq!(stats.dropped_no_qids, 1);

    let kept = read_file(&filtered_quotes_path(dir.path(), 2020));
    assert!(kept.iter().all(Quotation::has_qids));
}

#[test]
fn existing_output_is_skipped_without_reading_input() {
    let dir = tempfile::tempdir().unwrap();
    // No raw file at all: the year must be skipped before input is touched
    fs::write(filtered_quotes_path(dir.path(), 2016), b"").unwrap();

    let outcomes = run_years(dir.path(), dir.path(), 2016..=2016, FilterPolicy::default()).unwrap();
    assert_eq!(outcomes, vec![(2016, YearOutcome::Skipped)]);
}

#[test]
fn malformed_line_aborts_and_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let good = serde_json::to_string(&quotations()[0]).unwrap();
    let body = format!("{good}\n{{\"speaker\": oops\n");

    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    std::io::Write::write_all(&mut encoder, body.as_bytes()).unwrap();
    fs::write(raw_quotes_path(dir.path(), 2017), encoder.finish().unwrap()).unwrap();

    let err = run_years(dir.path(), dir.path(), 2017..=2017, FilterPolicy::default()).unwrap_err();
    assert!(format!("{err:#}").contains("line 2"));
    assert!(!filtered_quotes_path(dir.path(), 2017).exists());
}

#[test]
fn missing_input_year_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_years(dir.path(), dir.path(), 2018..=2018, FilterPolicy::default()).unwrap_err();
    assert!(err.to_string().contains("2018"));
}

// ============================================================
// Filter -> Enrich
// ============================================================

#[tokio::test]
async fn filtered_year_enriches_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&raw_quotes_path(dir.path(), 2019), &quotations());
    run_years(dir.path(), dir.path(), 2019..=2019, FilterPolicy::SpeakerOrEmptyQids).unwrap();

    let plan = ColumnPlan::from_lists(["gender", "nationality"], ["date_of_birth"]);
    let run = run_year(
        dir.path(),
        2019,
        &plan,
        &table(),
        &resolver(),
        EnrichSettings::default(),
        false,
    )
    .await
    .unwrap()
    .expect("enriched file should not exist yet");

    assert_eq!(run.stats.records, 2);
    assert_eq!(run.stats.columns["gender"].assigned, 2);
    assert_eq!(run.stats.columns["nationality"].absent, 1);
    assert_eq!(run.stats.columns["date_of_birth"].assigned, 1);
    assert!(run.stats.skipped.is_empty());
    assert_eq!(run.preview.len(), 2);

    let enriched = read_file(&enriched_quotes_path(dir.path(), 2019));
    assert_eq!(enriched[0].string_list("gender"), Some(vec!["male"]));
    assert_eq!(enriched[0].string_list("nationality"), Some(vec!["United Kingdom"]));
    assert!(!enriched[0].contains_field("date_of_birth"));
    assert_eq!(
        enriched[1].string_list("date_of_birth"),
        Some(vec!["+1934-11-09T00:00:00Z"])
    );
    // Original fields survive enrichment
    assert_eq!(enriched[1].get("numOccurrences"), Some(&json!(2)));

    // Second run is skipped unless forced
    let again = run_year(
        dir.path(),
        2019,
        &plan,
        &table(),
        &resolver(),
        EnrichSettings::default(),
        false,
    )
    .await
    .unwrap();
    assert!(again.is_none());
}

#[tokio::test]
async fn enrichment_respects_limit_and_preview() {
    let kept: Vec<Quotation> = quotations().into_iter().filter(|q| q.has_qids()).collect();
    let mut input = JsonLinesWriter::new(Vec::new(), Compression::Gzip);
    for q in &kept {
        input.write(q).unwrap();
    }
    let input = input.finish().unwrap();

    let mut out = JsonLinesWriter::new(Vec::new(), Compression::Plain);
    let settings = EnrichSettings {
        limit: Some(1),
        preview: 0,
        ignore_existing: true,
    };
    let run = enrich_quotations(
        JsonLinesReader::new(
            quotescope::quotes::codec::decoder(Cursor::new(input), Compression::Gzip),
            "mem",
        ),
        &mut out,
        &ColumnPlan::from_lists(["gender"], Vec::<String>::new()),
        &table(),
        &resolver(),
        settings,
        &ProgressBar::hidden(),
    )
    .await
    .unwrap();

    assert_eq!(run.stats.records, 1);
    assert!(run.preview.is_empty());
    let out = String::from_utf8(out.finish().unwrap()).unwrap();
    assert_eq!(out.lines().count(), 1);
}

#[tokio::test]
async fn unknown_plan_column_fails_before_any_record() {
    let mut out = JsonLinesWriter::new(Vec::new(), Compression::Plain);
    let err = enrich_quotations(
        JsonLinesReader::new(Cursor::new("{\"speaker\":\"A\",\"qids\":[\"Q5\"]}\n"), "mem"),
        &mut out,
        &ColumnPlan::default(),
        &table(),
        &resolver(),
        EnrichSettings::default(),
        &ProgressBar::hidden(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("does not exist in the speaker attributes table"));
    assert_eq!(out.written(), 0);
}

#[tokio::test]
async fn unresolved_labels_are_aggregated_across_records() {
    let mut table = AttributeTable::new(["id", "party"]);
    table.insert_row(
        "Q5",
        [("party".to_string(), vec!["Q1".to_string(), "Q6581072".to_string()])]
            .into_iter()
            .collect(),
    );

    let line = "{\"speaker\":\"A\",\"qids\":[\"Q5\"]}\n";
    let mut out = JsonLinesWriter::new(Vec::new(), Compression::Plain);
    let run = enrich_quotations(
        JsonLinesReader::new(Cursor::new(line.repeat(3)), "mem"),
        &mut out,
        &ColumnPlan::from_lists(["party"], Vec::<String>::new()),
        &table,
        &resolver(),
        EnrichSettings::default(),
        &ProgressBar::hidden(),
    )
    .await
    .unwrap();

    assert_eq!(run.stats.records, 3);
    assert_eq!(run.stats.skipped.len(), 1);
    assert!(run.stats.skipped.contains_key("Q1"));
    assert_eq!(run.stats.skipped_lookups, 3);
    assert_eq!(run.preview[0].string_list("party"), Some(vec!["female"]));
}
