//! Quantile-based pruning and promotion
//!
//! Runs once over the finished corpus:
//! 1. Prune `New` papers at or below the pruning quantile, repair edges, drop
//!    papers left without any edge
//! 2. Promote `New` papers at or above the promotion quantile of the survivors

use super::Corpus;
use citeforge_common::config::{ClassificationConfig, QuantileBasis};
use citeforge_common::metrics;
use citeforge_common::Membership;
use std::collections::HashSet;
use tracing::{debug, info};

/// Result of the pruning pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneOutcome {
    /// Occurrence threshold, `None` when there was nothing to measure
    pub threshold: Option<f64>,
    pub low_signal_removed: usize,
    pub edges_removed: usize,
    pub isolated_removed: usize,
}

impl PruneOutcome {
    pub fn papers_removed(&self) -> usize {
        self.low_signal_removed + self.isolated_removed
    }
}

/// Result of the promotion pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromoteOutcome {
    pub threshold: Option<f64>,
    pub promoted: usize,
}

/// Combined result of both passes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationOutcome {
    pub prune: PruneOutcome,
    pub promote: PromoteOutcome,
}

/// Pruning and promotion with configurable quantiles
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassificationConfig,
}

impl Classifier {
    pub fn new(config: ClassificationConfig) -> Self {
        Self { config }
    }

    /// Run both passes in order
    pub fn run(&self, corpus: &mut Corpus) -> ClassificationOutcome {
        let prune = self.prune(corpus);
        let promote = self.promote(corpus);

        metrics::record_classification(prune.papers_removed(), promote.promoted);
        metrics::record_corpus(corpus.len(), corpus.edge_count());

        ClassificationOutcome { prune, promote }
    }

    /// Pruning pass
    pub fn prune(&self, corpus: &mut Corpus) -> PruneOutcome {
        let threshold = self.threshold(corpus, self.config.prune_quantile);

        let low_signal: HashSet<String> = match threshold {
            Some(threshold) => corpus
                .papers()
                .iter()
                .filter(|p| p.membership == Membership::New && f64::from(p.occurrence) <= threshold)
                .map(|p| p.paper_id.clone())
                .collect(),
            None => HashSet::new(),
        };

        let low_signal_removed = corpus.remove_papers(&low_signal);
        let edges_removed = corpus.remove_dangling_edges();
        let isolated_removed = corpus.remove_isolated_papers();

        info!(
            threshold = ?threshold,
            quantile = self.config.prune_quantile,
            low_signal_removed,
            edges_removed,
            isolated_removed,
            remaining = corpus.len(),
            "Pruned low-signal papers"
        );

        PruneOutcome {
            threshold,
            low_signal_removed,
            edges_removed,
            isolated_removed,
        }
    }

    /// Promotion pass
    pub fn promote(&self, corpus: &mut Corpus) -> PromoteOutcome {
        let threshold = self.threshold(corpus, self.config.promote_quantile);

        let mut promoted = 0;
        if let Some(threshold) = threshold {
            for paper in corpus.papers_mut() {
                if paper.membership == Membership::New
                    && f64::from(paper.occurrence) >= threshold
                    && paper.promote()
                {
                    debug!(paper_id = %paper.paper_id, occurrence = paper.occurrence, "Recommended");
                    promoted += 1;
                }
            }
        }

        info!(
            threshold = ?threshold,
            quantile = self.config.promote_quantile,
            promoted,
            "Promoted recommended papers"
        );

        PromoteOutcome { threshold, promoted }
    }

    fn threshold(&self, corpus: &Corpus, q: f64) -> Option<f64> {
        let counts: Vec<u32> = corpus
            .papers()
            .iter()
            .filter(|p| match self.config.quantile_basis {
                QuantileBasis::NewOnly => p.membership == Membership::New,
                QuantileBasis::AllRecords => true,
            })
            .map(|p| p.occurrence)
            .collect();

        quantile(&counts, q)
    }
}

/// Linear-interpolated quantile of `values` at `q` in `[0, 1]`.
///
/// Uses `pos = q * (n - 1)` between neighbouring order statistics.
/// Returns `None` for an empty slice.
pub fn quantile(values: &[u32], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let lower = f64::from(sorted[lo]);
    let upper = f64::from(sorted[hi]);

    Some(lower + (upper - lower) * (pos - lo as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeforge_common::config::OwnedResighting;
    use citeforge_common::{EdgeKind, PaperRecord};

    fn config(prune: f64, promote: f64) -> ClassificationConfig {
        ClassificationConfig {
            prune_quantile: prune,
            promote_quantile: promote,
            ..ClassificationConfig::default()
        }
    }

    /// Owned paper "O" linked to new papers with the given counts
    fn corpus_with_counts(counts: &[u32]) -> Corpus {
        let mut corpus = Corpus::new();
        corpus.merge_owned(PaperRecord::new("O", "Owned", Membership::Owned), OwnedResighting::Increment);
        for (i, &count) in counts.iter().enumerate() {
            let id = format!("N{}", i);
            for _ in 0..count {
                corpus.merge("O", PaperRecord::new(id.as_str(), "New", Membership::New), EdgeKind::Reference);
            }
        }
        corpus
    }

    fn assert_consistent(corpus: &Corpus) {
        for edge in corpus.edges() {
            assert!(corpus.contains(&edge.from), "dangling from {}", edge.from);
            assert!(corpus.contains(&edge.to), "dangling to {}", edge.to);
        }
        for paper in corpus.papers() {
            assert!(
                corpus.edges().iter().any(|e| e.touches(&paper.paper_id)),
                "isolated {}",
                paper.paper_id
            );
        }
    }

    #[test]
    fn test_quantile_interpolation() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7], 0.95), Some(7.0));
        assert_eq!(quantile(&[1, 2, 3, 4, 5], 0.5), Some(3.0));
        assert_eq!(quantile(&[4, 1, 3, 2], 0.0), Some(1.0));
        assert_eq!(quantile(&[4, 1, 3, 2], 1.0), Some(4.0));

        let q = quantile(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 20], 0.95).unwrap();
        assert!((q - 11.45).abs() < 1e-9);
    }

    #[test]
    fn test_single_outlier_scenario() {
        let mut corpus = corpus_with_counts(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 20]);
        let classifier = Classifier::new(config(0.95, 0.98));

        let outcome = classifier.run(&mut corpus);

        assert_eq!(outcome.prune.low_signal_removed, 9);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("N9").unwrap().membership, Membership::Recommended);
        assert_eq!(corpus.get("O").unwrap().membership, Membership::Owned);
        assert_eq!(outcome.promote.promoted, 1);
        assert_eq!(corpus.edge_count(), 20);
        assert_consistent(&corpus);
    }

    #[test]
    fn test_ties_at_boundary_are_promoted_together() {
        let mut corpus = corpus_with_counts(&[1, 1, 1, 1, 1, 1, 1, 1, 9, 9]);
        let classifier = Classifier::new(config(0.5, 0.98));

        classifier.run(&mut corpus);

        assert_eq!(corpus.count_membership(Membership::Recommended), 2);
        assert_eq!(corpus.count_membership(Membership::New), 0);
    }

    #[test]
    fn test_single_distinct_value_prunes_everything_new() {
        let mut corpus = corpus_with_counts(&[3, 3, 3]);
        let classifier = Classifier::new(config(0.95, 0.98));

        let outcome = classifier.run(&mut corpus);

        // Every new paper sits at the threshold; the owned paper is left isolated
        assert_eq!(outcome.prune.threshold, Some(3.0));
        assert_eq!(outcome.prune.low_signal_removed, 3);
        assert_eq!(outcome.prune.isolated_removed, 1);
        assert!(corpus.is_empty());
        assert_eq!(corpus.edge_count(), 0);
        assert_eq!(outcome.promote.threshold, None);
    }

    #[test]
    fn test_isolated_owned_paper_removed() {
        let mut corpus = corpus_with_counts(&[1, 5]);
        corpus.merge_owned(PaperRecord::new("Lonely", "No refs", Membership::Owned), OwnedResighting::Increment);
        let classifier = Classifier::new(config(0.5, 0.98));

        let outcome = classifier.prune(&mut corpus);

        assert!(!corpus.contains("Lonely"));
        assert!(corpus.contains("O"));
        assert!(corpus.contains("N1"));
        assert_eq!(outcome.isolated_removed, 1);
        assert_consistent(&corpus);
    }

    #[test]
    fn test_edges_between_owned_papers_survive() {
        let mut corpus = Corpus::new();
        corpus.merge_owned(PaperRecord::new("A", "A", Membership::Owned), OwnedResighting::Increment);
        corpus.merge_owned(PaperRecord::new("B", "B", Membership::Owned), OwnedResighting::Increment);
        corpus.merge("A", PaperRecord::new("B", "B", Membership::New), EdgeKind::Reference);
        corpus.merge("A", PaperRecord::new("C", "C", Membership::New), EdgeKind::Reference);

        let classifier = Classifier::new(config(0.95, 0.98));
        let outcome = classifier.run(&mut corpus);

        assert_eq!(outcome.prune.low_signal_removed, 1);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.edge_count(), 1);
        assert_eq!(outcome.promote.promoted, 0);
        assert_consistent(&corpus);
    }

    #[test]
    fn test_promotion_never_touches_owned() {
        let mut corpus = corpus_with_counts(&[2, 8]);
        // Re-sight the owned paper often so it has the highest count
        for _ in 0..20 {
            corpus.merge("N1", PaperRecord::new("O", "Owned", Membership::New), EdgeKind::Citation);
        }
        let classifier = Classifier::new(ClassificationConfig {
            prune_quantile: 0.0,
            promote_quantile: 0.0,
            quantile_basis: QuantileBasis::AllRecords,
            ..ClassificationConfig::default()
        });

        classifier.run(&mut corpus);

        assert_eq!(corpus.get("O").unwrap().membership, Membership::Owned);
        for paper in corpus.papers() {
            assert!(matches!(paper.membership, Membership::Owned | Membership::Recommended));
        }
    }

    #[test]
    fn test_all_records_basis_uses_owned_counts() {
        // Owned paper re-sighted to 10; new papers at 1 and 4
        let mut corpus = corpus_with_counts(&[1, 4]);
        for _ in 0..9 {
            corpus.merge_owned(PaperRecord::new("O", "Owned", Membership::Owned), OwnedResighting::Increment);
        }

        let new_only = Classifier::new(config(0.5, 0.98));
        let mut a = corpus.clone();
        new_only.prune(&mut a);
        assert!(a.contains("N1"));

        let all_records = Classifier::new(ClassificationConfig {
            quantile_basis: QuantileBasis::AllRecords,
            ..config(0.5, 0.98)
        });
        let mut b = corpus.clone();
        let outcome = all_records.prune(&mut b);
        assert_eq!(outcome.threshold, Some(4.0));
        assert!(!b.contains("N1"));
        assert!(b.is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        let mut corpus = Corpus::new();
        let outcome = Classifier::new(ClassificationConfig::default()).run(&mut corpus);
        assert_eq!(outcome, ClassificationOutcome::default());
    }
}
