// Wikidata — identifier disambiguation and label lookups.
//
// Speakers in Quotebank come with one or more candidate QIDs. `qid` picks
// the one we treat as the speaker; `labels` turns attribute QIDs (gender,
// party, ...) into human-readable labels through a `LabelResolver`, which
// `client` implements against the public EntityData endpoint.

pub mod client;
pub mod labels;
pub mod qid;
pub mod traits;
