// Quotebank records and the compressed JSON lines files that carry them.
//
// Quotebank ships one bzip2-compressed JSON lines file per year. Every
// stage of the pipeline reads and writes that same format, so the record
// type, the codec and the year-based file naming all live here.

pub mod codec;
pub mod paths;
pub mod record;
