//! Corpus aggregation
//!
//! Owns every paper and relationship discovered so far. Records are kept in
//! first-sighting order with an identifier index for O(1) existence checks;
//! edges are append-only until the classification pass.

use citeforge_common::config::OwnedResighting;
use citeforge_common::{EdgeKind, Membership, PaperRecord, RelationshipEdge};
use std::collections::{HashMap, HashSet};

/// What happened to a record on merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First sighting, record stored as given
    Inserted,
    /// Known identifier, occurrence now at this value
    Incremented(u32),
    /// Known owned paper re-sighted under the `keep` policy
    Retagged,
}

/// Papers and relationships of one run
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    papers: Vec<PaperRecord>,
    index: HashMap<String, usize>,
    edges: Vec<RelationshipEdge>,
    extracted_total: usize,
}

impl Corpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of papers currently held
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Number of edges currently held
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Distinct papers ever inserted, including ones pruned later
    pub fn extracted_total(&self) -> usize {
        self.extracted_total
    }

    #[cfg(test)]
    pub fn get(&self, paper_id: &str) -> Option<&PaperRecord> {
        self.index.get(paper_id).map(|&i| &self.papers[i])
    }

    #[cfg(test)]
    pub fn contains(&self, paper_id: &str) -> bool {
        self.index.contains_key(paper_id)
    }

    /// Papers in first-sighting order
    pub fn papers(&self) -> &[PaperRecord] {
        &self.papers
    }

    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    /// Count papers carrying `membership`
    pub fn count_membership(&self, membership: Membership) -> usize {
        self.papers.iter().filter(|p| p.membership == membership).count()
    }

    /// Fold in a paper from the user's bibliography.
    ///
    /// A known identifier is forced to `Owned`; whether its count moves is
    /// governed by `policy`. No edge is recorded.
    pub fn merge_owned(&mut self, record: PaperRecord, policy: OwnedResighting) -> MergeOutcome {
        match self.index.get(&record.paper_id) {
            Some(&i) => {
                let existing = &mut self.papers[i];
                existing.mark_owned();
                match policy {
                    OwnedResighting::Increment => {
                        existing.bump();
                        MergeOutcome::Incremented(existing.occurrence)
                    }
                    OwnedResighting::Keep => MergeOutcome::Retagged,
                }
            }
            None => {
                let mut record = record;
                record.mark_owned();
                self.insert(record);
                MergeOutcome::Inserted
            }
        }
    }

    /// Record `from -> record` and fold the related paper in.
    ///
    /// The edge is always appended. A known identifier only gets its count
    /// bumped (tag untouched); an unknown one is inserted unchanged.
    pub fn merge(&mut self, from: &str, record: PaperRecord, kind: EdgeKind) -> MergeOutcome {
        self.edges.push(RelationshipEdge::new(from, record.paper_id.as_str(), kind));

        match self.index.get(&record.paper_id) {
            Some(&i) => {
                let existing = &mut self.papers[i];
                existing.bump();
                MergeOutcome::Incremented(existing.occurrence)
            }
            None => {
                self.insert(record);
                MergeOutcome::Inserted
            }
        }
    }

    fn insert(&mut self, record: PaperRecord) {
        self.index.insert(record.paper_id.clone(), self.papers.len());
        self.papers.push(record);
        self.extracted_total += 1;
    }

    /// Remove papers whose identifiers are in `ids`. Returns how many went.
    pub(crate) fn remove_papers(&mut self, ids: &HashSet<String>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let before = self.papers.len();
        self.papers.retain(|p| !ids.contains(&p.paper_id));
        self.reindex();
        before - self.papers.len()
    }

    /// Drop every edge with an endpoint outside the current paper set
    pub(crate) fn remove_dangling_edges(&mut self) -> usize {
        let before = self.edges.len();
        let index = &self.index;
        self.edges
            .retain(|e| index.contains_key(&e.from) && index.contains_key(&e.to));
        before - self.edges.len()
    }

    /// Drop every paper that is not an endpoint of any edge
    pub(crate) fn remove_isolated_papers(&mut self) -> usize {
        let connected: HashSet<&str> = self
            .edges
            .iter()
            .flat_map(|e| [e.from.as_str(), e.to.as_str()])
            .collect();

        let isolated: HashSet<String> = self
            .papers
            .iter()
            .filter(|p| !connected.contains(p.paper_id.as_str()))
            .map(|p| p.paper_id.clone())
            .collect();

        self.remove_papers(&isolated)
    }

    pub(crate) fn papers_mut(&mut self) -> impl Iterator<Item = &mut PaperRecord> {
        self.papers.iter_mut()
    }

    fn reindex(&mut self) {
        self.index = self
            .papers
            .iter()
            .enumerate()
            .map(|(i, p)| (p.paper_id.clone(), i))
            .collect();
    }
}
