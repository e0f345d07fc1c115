// Quotation enrichment — speaker attributes merged into each record.
//
// For every quotation we pick the speaker's QID, look up its row in the
// speaker attributes table, and copy the requested columns onto the
// record, either as labels resolved through Wikidata or as raw values.

pub mod column;
pub mod error;
pub mod plan;
