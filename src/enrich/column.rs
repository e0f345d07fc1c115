// Adding one speaker attribute column to one quotation.

use serde_json::Value;
use tracing::debug;

use super::error::EnrichError;
use crate::attributes::table::AttributeTable;
use crate::quotes::record::Quotation;
use crate::wikidata::labels::{map_ids_to_labels, SkippedIdentifier};
use crate::wikidata::qid::min_qid;
use crate::wikidata::traits::LabelResolver;

/// How a column's raw values turn into field values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnKind {
    /// Values are QIDs, resolved to their labels.
    #[default]
    Qid,
    /// Values are copied as they are (dates, free text).
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Overwrite the field if the quotation already has it. When false an
    /// existing field is an `EnrichError::FieldExists`.
    pub ignore_existing: bool,
    pub kind: ColumnKind,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            ignore_existing: true,
            kind: ColumnKind::Qid,
        }
    }
}

impl EnrichOptions {
    pub fn raw() -> Self {
        Self {
            kind: ColumnKind::Raw,
            ..Self::default()
        }
    }
}

/// What happened to one column of one quotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// The field was set to `values` entries. `skipped` lists QIDs whose
    /// labels could not be resolved and were left out.
    Assigned {
        values: usize,
        skipped: Vec<SkippedIdentifier>,
    },
    /// The speaker has no value for this column; the field was not set.
    Absent,
    /// The speaker's QID has no row in the table; the field was not set.
    NoSpeakerRow { speaker_id: String },
}

/// Enrich `quote` with `column`, mutating it in place.
///
/// Guards run first and in this order: existing field (unless
/// `ignore_existing`), unknown column, empty or malformed `qids`. A missing
/// row or absent cell leaves the quotation untouched.
pub async fn enrich_in_place(
    quote: &mut Quotation,
    column: &str,
    table: &AttributeTable,
    resolver: &dyn LabelResolver,
    options: EnrichOptions,
) -> Result<EnrichOutcome, EnrichError> {
    if !options.ignore_existing && quote.contains_field(column) {
        return Err(EnrichError::FieldExists(column.to_string()));
    }
    if !table.has_column(column) {
        return Err(EnrichError::UnknownColumn(column.to_string()));
    }

    let speaker_id = min_qid(quote.qids())?.to_string();

    let Some(row) = table.row(&speaker_id) else {
        debug!(speaker_id = %speaker_id, "Speaker not in attributes table");
        return Ok(EnrichOutcome::NoSpeakerRow { speaker_id });
    };
    let Some(raw) = row.get(column) else {
        return Ok(EnrichOutcome::Absent);
    };

    let (values, skipped) = match options.kind {
        ColumnKind::Qid => {
            let report = map_ids_to_labels(resolver, raw.as_slice()).await;
            (report.ordered_labels(raw.as_slice()), report.skipped)
        }
        ColumnKind::Raw => (raw.clone(), Vec::new()),
    };

    let count = values.len();
    quote.insert(
        column,
        Value::Array(values.into_iter().map(Value::String).collect()),
    );

    Ok(EnrichOutcome::Assigned {
        values: count,
        skipped,
    })
}

/// Copy-on-write variant of [`enrich_in_place`]: `quote` is left as is and
/// the enriched copy is returned.
pub async fn enrich_copy(
    quote: &Quotation,
    column: &str,
    table: &AttributeTable,
    resolver: &dyn LabelResolver,
    options: EnrichOptions,
) -> Result<(Quotation, EnrichOutcome), EnrichError> {
    let mut copy = quote.clone();
    let outcome = enrich_in_place(&mut copy, column, table, resolver, options).await?;
    Ok((copy, outcome))
}
