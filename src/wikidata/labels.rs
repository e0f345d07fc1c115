// Bulk identifier-to-label mapping with a partial-success report.
//
// Lookups that fail are skipped rather than aborting the batch: across
// millions of quotations a handful of deleted or label-less entities must
// not stop the run. Each skip is logged and kept in the report so the
// caller can surface it.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use super::traits::LabelResolver;

/// An identifier that could not be resolved, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedIdentifier {
    pub id: String,
    pub reason: String,
}

/// Result of mapping a batch of identifiers to labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelReport {
    /// Identifier → label for every successful lookup.
    pub labels: HashMap<String, String>,
    /// Identifiers that were left out of `labels`, in lookup order.
    pub skipped: Vec<SkippedIdentifier>,
}

impl LabelReport {
    pub fn resolved(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Labels for `ids` in their original order, each identifier once.
    /// Skipped identifiers contribute nothing.
    pub fn ordered_labels<S: AsRef<str>>(&self, ids: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        ids.iter()
            .map(AsRef::as_ref)
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.labels.get(id).cloned())
            .collect()
    }
}

/// Resolve every distinct identifier in `ids` through `resolver`.
///
/// Lookups run one at a time. The map is built fresh for this call and
/// dropped with the report; nothing is cached across calls.
pub async fn map_ids_to_labels<S: AsRef<str>>(
    resolver: &dyn LabelResolver,
    ids: &[S],
) -> LabelReport {
    let mut report = LabelReport::default();
    let mut seen = HashSet::new();

    for id in ids.iter().map(AsRef::as_ref) {
        if !seen.insert(id) {
            continue;
        }
        match resolver.resolve_label(id).await {
            Ok(label) => {
                report.labels.insert(id.to_string(), label);
            }
            Err(e) => {
                warn!(id = id, error = %e, "Failed to resolve label, skipping");
                report.skipped.push(SkippedIdentifier {
                    id: id.to_string(),
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    debug!(
        resolved = report.resolved(),
        skipped = report.skipped.len(),
        "Label lookup complete"
    );

    report
}
