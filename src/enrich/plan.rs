// Column plans — which attributes an enrichment run adds, and how.

use super::column::{enrich_in_place, ColumnKind, EnrichOptions, EnrichOutcome};
use super::error::EnrichError;
use crate::attributes::table::AttributeTable;
use crate::quotes::record::Quotation;
use crate::wikidata::traits::LabelResolver;

/// Attribute columns holding QIDs that need label lookups.
pub const DEFAULT_QID_COLUMNS: [&str; 5] = [
    "nationality",
    "party",
    "ethnic_group",
    "academic_degree",
    "gender",
];

/// Attribute columns copied as raw values.
pub const DEFAULT_RAW_COLUMNS: [&str; 1] = ["date_of_birth"];

/// Ordered list of columns to add to every quotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    columns: Vec<(String, ColumnKind)>,
}

impl Default for ColumnPlan {
    fn default() -> Self {
        Self::from_lists(DEFAULT_QID_COLUMNS, DEFAULT_RAW_COLUMNS)
    }
}

impl ColumnPlan {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// QID columns first, then raw columns, each in the given order.
    pub fn from_lists<Q, R>(qid_columns: Q, raw_columns: R) -> Self
    where
        Q: IntoIterator,
        Q::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let columns = qid_columns
            .into_iter()
            .map(|c| (c.into(), ColumnKind::Qid))
            .chain(raw_columns.into_iter().map(|c| (c.into(), ColumnKind::Raw)))
            .collect();
        Self { columns }
    }

    pub fn with(mut self, column: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.push((column.into(), kind));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Fail fast on columns the table doesn't have, before any record is touched.
    pub fn validate(&self, table: &AttributeTable) -> Result<(), EnrichError> {
        match self.iter().find(|(name, _)| !table.has_column(name)) {
            Some((name, _)) => Err(EnrichError::UnknownColumn(name.to_string())),
            None => Ok(()),
        }
    }
}

/// Apply every column of `plan` to `quote` in place.
///
/// Returns one outcome per column, in plan order. The first error aborts
/// the remaining columns; fields set before it stay set.
pub async fn enrich_columns(
    quote: &mut Quotation,
    plan: &ColumnPlan,
    table: &AttributeTable,
    resolver: &dyn LabelResolver,
    ignore_existing: bool,
) -> Result<Vec<(String, EnrichOutcome)>, EnrichError> {
    let mut outcomes = Vec::with_capacity(plan.len());
    for (column, kind) in plan.iter() {
        let options = EnrichOptions {
            ignore_existing,
            kind,
        };
        let outcome = enrich_in_place(quote, column, table, resolver, options).await?;
        outcomes.push((column.to_string(), outcome));
    }
    Ok(outcomes)
}
