// Speaker attributes — the per-QID reference table used for enrichment.

pub mod table;
