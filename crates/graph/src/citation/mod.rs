//! Citation corpus and classification
//!
//! Aggregates owned papers and everything they reference or are cited by,
//! then filters the corpus down to the papers worth recommending.

mod classify;
mod corpus;

pub use classify::Classifier;
pub use corpus::{Corpus, MergeOutcome};
