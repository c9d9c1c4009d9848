//! Run report
//!
//! The summary counts and the recommended table consumed by the console
//! output and the CSV exporter.

use crate::citation::Corpus;
use crate::pipeline::RunStats;
use chrono::{DateTime, Utc};
use citeforge_common::Membership;
use serde::Serialize;
use std::fmt;

/// Summary counts of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Owned papers resolved through the service
    pub owned_resolved: usize,
    /// Owned papers a lookup was attempted for
    pub owned_attempted: usize,
    /// Papers left after pruning
    pub surviving: usize,
    /// Distinct papers ever inserted into the corpus
    pub extracted_total: usize,
    pub recommended: usize,
    pub aborted: bool,
}

/// One row of the recommended table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedRow {
    #[serde(rename = "authors")]
    pub first_author_surname: Option<String>,
    pub year: Option<u32>,
    pub doi: Option<String>,
    pub title: String,
    pub occurrence: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: ReportSummary,
    /// Recommended papers in corpus order
    pub recommended: Vec<RecommendedRow>,
    pub generated_at: DateTime<Utc>,
}

/// Project the classified corpus into the final report
pub fn build_report(corpus: &Corpus, stats: &RunStats) -> Report {
    let recommended: Vec<RecommendedRow> = corpus
        .papers()
        .iter()
        .filter(|p| p.membership == Membership::Recommended)
        .map(|p| RecommendedRow {
            first_author_surname: p.first_author_surname().map(str::to_string),
            year: p.year,
            doi: p.doi.clone(),
            title: p.title.clone(),
            occurrence: p.occurrence,
        })
        .collect();

    Report {
        summary: ReportSummary {
            owned_resolved: stats.resolved,
            owned_attempted: stats.attempted,
            surviving: corpus.len(),
            extracted_total: corpus.extracted_total(),
            recommended: recommended.len(),
            aborted: stats.aborted,
        },
        recommended,
        generated_at: Utc::now(),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(f, "Owned papers resolved: {} of {}", s.owned_resolved, s.owned_attempted)?;
        if s.aborted {
            writeln!(f, "Stopped early on request; results cover the papers processed so far")?;
        }
        writeln!(f, "Papers kept after pruning: {} of {}", s.surviving, s.extracted_total)?;
        writeln!(f, "Recommended papers: {}", s.recommended)?;

        if self.recommended.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "{:<20} {:>4} {:>5}  {:<30} Title", "Author", "Year", "Occ.", "DOI")?;
        for row in &self.recommended {
            writeln!(
                f,
                "{:<20} {:>4} {:>5}  {:<30} {}",
                row.first_author_surname.as_deref().unwrap_or("-"),
                row.year.map_or_else(|| "-".to_string(), |y| y.to_string()),
                row.occurrence,
                row.doi.as_deref().unwrap_or("-"),
                row.title
            )?;
        }
        Ok(())
    }
}
