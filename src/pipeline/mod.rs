// Batch stages over whole year files.
//
// `filter` drops quotations without a speaker; `enrich` adds speaker
// attributes to what is left. The stages share nothing but the files.

pub mod enrich;
pub mod filter;
