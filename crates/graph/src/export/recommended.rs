//! CSV list of recommended papers

use super::{ensure_parent, may_write, WriteOutcome};
use crate::errors::Result;
use crate::report::RecommendedRow;
use std::path::Path;
use tracing::info;

/// Write one row per recommended paper with header
/// `authors,year,doi,title,occurrence`
pub fn write_recommended_csv(path: &Path, rows: &[RecommendedRow], overwrite: bool) -> Result<WriteOutcome> {
    if !may_write(path, overwrite) {
        return Ok(WriteOutcome::Skipped);
    }
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(["authors", "year", "doi", "title", "occurrence"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Recommended papers written");
    Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<RecommendedRow> {
        vec![
            RecommendedRow {
                first_author_surname: Some("Hopper".into()),
                year: Some(1952),
                doi: Some("10.1/compiler".into()),
                title: "The Education of a Computer, Part 1".into(),
                occurrence: 7,
            },
            RecommendedRow {
                first_author_surname: None,
                year: None,
                doi: None,
                title: "Untitled".into(),
                occurrence: 5,
            },
        ]
    }

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recommended.csv");

        let outcome = write_recommended_csv(&path, &rows(), true).unwrap();

        assert_eq!(outcome, WriteOutcome::Written);
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "authors,year,doi,title,occurrence");
        assert_eq!(lines[1], "Hopper,1952,10.1/compiler,\"The Education of a Computer, Part 1\",7");
        assert_eq!(lines[2], ",,,Untitled,5");
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recommended.csv");

        write_recommended_csv(&path, &[], true).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "authors,year,doi,title,occurrence");
    }

    #[test]
    fn test_existing_file_kept_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recommended.csv");
        std::fs::write(&path, "keep me").unwrap();

        let outcome = write_recommended_csv(&path, &rows(), false).unwrap();

        assert_eq!(outcome, WriteOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
