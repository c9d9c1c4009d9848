//! Graph view of the classified corpus
//!
//! Nodes are coloured by membership and sized by occurrence, normalised so
//! the most frequent paper is always drawn at `max_node_size`.

use crate::citation::Corpus;
use citeforge_common::{Membership, PaperRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub color: &'static str,
    pub size: u32,
    pub membership: Membership,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    /// Build the view from the surviving papers and relationships
    pub fn from_corpus(corpus: &Corpus, max_node_size: u32) -> Self {
        let papers = corpus.papers();
        let min = papers.iter().map(|p| p.occurrence).min().unwrap_or(0);
        let max = papers.iter().map(|p| p.occurrence).max().unwrap_or(0);

        let nodes = papers
            .iter()
            .map(|p| GraphNode {
                id: p.paper_id.clone(),
                label: node_label(p),
                title: tooltip(p),
                color: node_color(p.membership),
                size: node_size(p.occurrence, min, max, max_node_size),
                membership: p.membership,
            })
            .collect();

        let edges = corpus
            .edges()
            .iter()
            .map(|e| GraphEdge {
                source: e.from.clone(),
                target: e.to.clone(),
            })
            .collect();

        Self { nodes, edges }
    }
}

pub fn node_color(membership: Membership) -> &'static str {
    match membership {
        Membership::New => "#a9a9a9",
        Membership::Owned => "#1e90ff",
        Membership::Recommended => "#ff8c00",
    }
}

/// `ceil(max_size * (occ - min + 1) / (max - min + 1))`
pub fn node_size(occurrence: u32, min: u32, max: u32, max_size: u32) -> u32 {
    let span = u64::from(max.saturating_sub(min)) + 1;
    let rank = u64::from(occurrence.saturating_sub(min)) + 1;
    let size = (u64::from(max_size) * rank).div_ceil(span);
    u32::try_from(size).unwrap_or(max_size)
}

/// `<surname> <year>`, with `X` and `0` standing in for missing parts
pub fn node_label(paper: &PaperRecord) -> String {
    format!(
        "{} {}",
        paper.first_author_surname().unwrap_or("X"),
        paper.year.unwrap_or(0)
    )
}

fn tooltip(paper: &PaperRecord) -> String {
    format!(
        "Authors: {}\nYear: {}\nTitle: {}\nOccurrences: {}",
        paper.authors.join(", "),
        paper.year.map_or_else(|| "unknown".to_string(), |y| y.to_string()),
        paper.title,
        paper.occurrence
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeforge_common::config::OwnedResighting;
    use citeforge_common::EdgeKind;

    #[test]
    fn test_node_size_normalised_to_max() {
        assert_eq!(node_size(20, 1, 20, 10), 10);
        assert_eq!(node_size(1, 1, 20, 10), 1);
        assert_eq!(node_size(10, 1, 20, 10), 5);
        assert_eq!(node_size(3, 3, 3, 10), 10);
        assert_eq!(node_size(1000, 1, 1000, 10), 10);
    }

    #[test]
    fn test_node_label_fallbacks() {
        let mut paper = PaperRecord::new("p", "T", Membership::New);
        assert_eq!(node_label(&paper), "X 0");

        paper.authors = vec!["Barbara Liskov".into()];
        paper.year = Some(1987);
        assert_eq!(node_label(&paper), "Liskov 1987");
    }

    #[test]
    fn test_view_from_corpus() {
        let mut corpus = Corpus::new();
        corpus.merge_owned(PaperRecord::new("O", "Owned", Membership::Owned), OwnedResighting::Increment);
        corpus.merge("O", PaperRecord::new("N", "New", Membership::New), EdgeKind::Reference);
        corpus.merge("O", PaperRecord::new("N", "New", Membership::New), EdgeKind::Citation);

        let view = GraphView::from_corpus(&corpus, 10);

        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.edges.len(), 2);
        assert_eq!(view.nodes[0].color, "#1e90ff");
        assert_eq!(view.nodes[0].size, 5);
        assert_eq!(view.nodes[1].color, "#a9a9a9");
        assert_eq!(view.nodes[1].size, 10);
        assert!(view.nodes[1].title.contains("Occurrences: 2"));
        assert_eq!(view.edges[0], GraphEdge { source: "O".into(), target: "N".into() });
    }

    #[test]
    fn test_empty_view() {
        assert_eq!(GraphView::from_corpus(&Corpus::new(), 10), GraphView::default());
    }
}
