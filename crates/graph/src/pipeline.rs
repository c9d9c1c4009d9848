//! Corpus build loop
//!
//! Processes the bibliography strictly in order: one fetch at a time, each
//! result folded into the corpus before the next request is issued.

use crate::bibliography::BibEntry;
use crate::citation::{Corpus, MergeOutcome};
use crate::extract::extract;
use citeforge_common::config::OwnedResighting;
use citeforge_common::scholar::{Fetcher, RawPaper, SkipReason};
use citeforge_common::{metrics, EdgeKind, Membership, MetadataResult, MetadataSource, RateLimitDecider};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Per-run counters for the bibliography loop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Entries in the bibliography
    pub entries_total: usize,
    /// Entries with a DOI that were fetched before the loop ended
    pub attempted: usize,
    pub resolved: usize,
    /// Resolved owned papers that were already in the corpus
    pub owned_resighted: usize,
    pub missing_identifier: usize,
    pub not_found: usize,
    pub rate_limit_exhausted: usize,
    pub transport_failures: usize,
    /// The loop was stopped on request
    pub aborted: bool,
}

/// Corpus plus the counters gathered while building it
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub corpus: Corpus,
    pub stats: RunStats,
}

/// Fetch every owned entry and fold the results into a fresh corpus
pub async fn build_corpus<S: MetadataSource>(
    entries: &[BibEntry],
    fetcher: &Fetcher<S>,
    decider: &dyn RateLimitDecider,
    resighting: OwnedResighting,
) -> BuildOutcome {
    let mut corpus = Corpus::new();
    let mut stats = RunStats {
        entries_total: entries.len(),
        ..RunStats::default()
    };

    for (i, entry) in entries.iter().enumerate() {
        info!("Processing paper {} of {}", i + 1, entries.len());

        let Some(doi) = entry.doi.as_deref() else {
            warn!(key = %entry.key, "Entry has no DOI, skipping");
            stats.missing_identifier += 1;
            continue;
        };

        stats.attempted += 1;
        match fetcher.fetch(doi, decider).await {
            MetadataResult::Found(raw) => {
                match fold_owned(&mut corpus, &raw, resighting) {
                    Some(MergeOutcome::Inserted) => stats.resolved += 1,
                    Some(_) => {
                        stats.resolved += 1;
                        stats.owned_resighted += 1;
                    }
                    None => {
                        warn!(doi = %doi, "Service record has no paper identifier, skipping");
                        stats.not_found += 1;
                    }
                }
            }
            MetadataResult::Skip(reason) => match reason {
                SkipReason::NotFound { .. } => stats.not_found += 1,
                SkipReason::RateLimitExhausted { .. } => stats.rate_limit_exhausted += 1,
                SkipReason::Transport { .. } => stats.transport_failures += 1,
            },
            MetadataResult::Abort => {
                warn!(doi = %doi, processed = i, "Stopping early, keeping papers collected so far");
                stats.aborted = true;
                break;
            }
        }

        metrics::record_corpus(corpus.len(), corpus.edge_count());
    }

    info!(
        papers = corpus.len(),
        edges = corpus.edge_count(),
        resolved = stats.resolved,
        attempted = stats.attempted,
        "Corpus built"
    );

    BuildOutcome { corpus, stats }
}

/// Merge one resolved owned paper and its neighbourhood.
///
/// Returns how the owned record was merged, or `None` when it cannot be keyed.
#[instrument(skip_all, fields(paper_id = ?raw.paper_id))]
fn fold_owned(corpus: &mut Corpus, raw: &RawPaper, resighting: OwnedResighting) -> Option<MergeOutcome> {
    let owned = extract(raw, Membership::Owned)?;
    let owned_id = owned.paper_id.clone();
    let outcome = corpus.merge_owned(owned, resighting);
    debug!(?outcome, "Owned record folded");

    let neighbours = raw
        .references
        .iter()
        .map(|r| (r, EdgeKind::Reference))
        .chain(raw.citations.iter().map(|c| (c, EdgeKind::Citation)));

    let mut merged = 0usize;
    let mut first_seen = 0usize;
    for (related, kind) in neighbours {
        match extract(related, Membership::New) {
            Some(record) => {
                if corpus.merge(&owned_id, record, kind) == MergeOutcome::Inserted {
                    first_seen += 1;
                }
                merged += 1;
            }
            None => debug!(?kind, "Related record has no paper identifier, skipping"),
        }
    }

    debug!(
        references = raw.references.len(),
        citations = raw.citations.len(),
        merged,
        first_seen,
        "Owned paper merged"
    );
    Some(outcome)
}
