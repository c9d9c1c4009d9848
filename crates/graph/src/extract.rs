//! Paper record extraction
//!
//! Normalizes raw service records into corpus records with a membership tag.

use citeforge_common::scholar::RawPaper;
use citeforge_common::{Membership, PaperRecord};

/// Convert a raw record into a `PaperRecord` with `occurrence = 1`.
///
/// Missing year/DOI stay `None`, missing authors become an empty list and a
/// missing title an empty string. Returns `None` only when the raw record has
/// no service identifier, since nothing can be keyed on it.
pub fn extract(raw: &RawPaper, membership: Membership) -> Option<PaperRecord> {
    let paper_id = raw
        .paper_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())?;

    let authors = raw
        .authors
        .iter()
        .filter_map(|author| author.display_name())
        .map(str::to_string)
        .collect();

    Some(PaperRecord {
        paper_id: paper_id.to_string(),
        authors,
        year: raw.year,
        doi: raw.doi.clone().filter(|doi| !doi.trim().is_empty()),
        title: raw.title.clone().unwrap_or_default(),
        occurrence: 1,
        membership,
    })
}
