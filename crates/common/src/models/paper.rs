//! Paper record entity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Membership of a paper in the user's literature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    /// Present in the user's own bibliography
    Owned,
    /// Discovered only through a reference or citation
    New,
    /// A new paper whose occurrence count crossed the promotion threshold
    Recommended,
}

impl Membership {
    pub fn as_str(&self) -> &'static str {
        match self {
            Membership::Owned => "owned",
            Membership::New => "new",
            Membership::Recommended => "recommended",
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical paper record held by the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Service identifier, unique within a corpus
    pub paper_id: String,

    /// Author display names in publication order
    pub authors: Vec<String>,

    pub year: Option<u32>,

    pub doi: Option<String>,

    pub title: String,

    /// Number of sightings, starts at 1
    pub occurrence: u32,

    pub membership: Membership,
}

impl PaperRecord {
    /// Create a record on its first sighting
    pub fn new(paper_id: impl Into<String>, title: impl Into<String>, membership: Membership) -> Self {
        Self {
            paper_id: paper_id.into(),
            authors: Vec::new(),
            year: None,
            doi: None,
            title: title.into(),
            occurrence: 1,
            membership,
        }
    }

    /// Record one more sighting
    pub fn bump(&mut self) {
        self.occurrence = self.occurrence.saturating_add(1);
    }

    /// Mark as owned. Only a `New` record changes; `Owned` is already final
    /// and `Recommended` is never downgraded.
    pub fn mark_owned(&mut self) {
        if self.membership == Membership::New {
            self.membership = Membership::Owned;
        }
    }

    /// Promote a `New` record to `Recommended`. Returns whether the tag changed.
    pub fn promote(&mut self) -> bool {
        if self.membership == Membership::New {
            self.membership = Membership::Recommended;
            true
        } else {
            false
        }
    }

    /// Surname of the first author, taken as the last whitespace-separated token
    pub fn first_author_surname(&self) -> Option<&str> {
        self.authors
            .first()
            .and_then(|name| name.split_whitespace().last())
    }
}
