// Quotescope: speaker filtering and Wikidata enrichment for Quotebank
//
// This is the library root. Each module corresponds to a part of the
// two-stage batch pipeline (filter, then enrich).

pub mod attributes;
pub mod config;
pub mod enrich;
pub mod output;
pub mod pipeline;
pub mod quotes;
pub mod status;
pub mod wikidata;
