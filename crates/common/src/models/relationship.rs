//! Relationship edge between papers

use serde::{Deserialize, Serialize};

/// How an edge was discovered. Both kinds feed the same edge set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// `to` appears in the reference list of `from`
    Reference,
    /// `to` appears in the citation list of `from`
    Citation,
}

/// Directed edge `from -> to`
///
/// Duplicates are allowed; every discovery event appends its own edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl RelationshipEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    /// Whether `paper_id` is either endpoint
    pub fn touches(&self, paper_id: &str) -> bool {
        self.from == paper_id || self.to == paper_id
    }
}
