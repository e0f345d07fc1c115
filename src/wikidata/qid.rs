// Speaker identifier disambiguation.
//
// A speaker name can map to several Wikidata entities. We pick the QID
// with the smallest number, i.e. the entity created earliest. It is a
// heuristic, but it is stable and deterministic across runs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QidError {
    #[error("cannot disambiguate an empty identifier set")]
    EmptyCandidates,
    #[error("identifier {0:?} does not end in an integer")]
    Malformed(String),
}

/// Numeric part of an identifier of the form `<prefix><integer>` (`Q42` → 42).
pub fn qid_number(id: &str) -> Result<u64, QidError> {
    let malformed = || QidError::Malformed(id.to_string());
    let start = id.find(|c: char| c.is_ascii_digit()).ok_or_else(malformed)?;
    let digits = &id[start..];
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    digits.parse().map_err(|_| malformed())
}

/// Pick the candidate with the smallest numeric suffix.
///
/// Equal numbers (`P5` and `Q5`) fall back to string order. Every
/// candidate must be well formed, and an empty set is an error rather
/// than a guess.
pub fn min_qid<'a, I>(candidates: I) -> Result<&'a str, QidError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(u64, &'a str)> = None;
    for id in candidates {
        let key = (qid_number(id)?, id);
        if best.map_or(true, |current| key < current) {
            best = Some(key);
        }
    }
    best.map(|(_, id)| id).ok_or(QidError::EmptyCandidates)
}
