// Typed enrichment failures.
//
// These are the conditions that abort an enrichment run. Per-identifier
// label failures are not errors; they end up in the `LabelReport`.

use thiserror::Error;

use crate::wikidata::qid::QidError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichError {
    /// The quotation already has the field and overwriting was not allowed.
    #[error("field \"{0}\" already exists on the quotation")]
    FieldExists(String),

    /// The requested field is not a column of the speaker attributes table.
    #[error("field \"{0}\" does not exist in the speaker attributes table")]
    UnknownColumn(String),

    /// The speaker identifier could not be picked from the candidate set.
    #[error("cannot pick speaker identifier: {0}")]
    Qid(#[from] QidError),
}
