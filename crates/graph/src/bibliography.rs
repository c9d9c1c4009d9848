//! Bibliography input
//!
//! Reads the user's own papers as a list of entries with an optional DOI.
//! BibTeX (`.bib`) and plain DOI lists (`.txt`, one per line) are supported.

use crate::errors::{GraphError, Result};
use regex_lite::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// One owned entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    /// Citation key, or `line N` for plain lists
    pub key: String,
    /// Normalized DOI, `None` when the entry has none
    pub doi: Option<String>,
}

const DOI_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

/// Entries whose BibTeX type is not a publication
const NON_ENTRY_TYPES: &[&str] = &["comment", "string", "preamble"];

fn entry_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\s*(\w+)\s*[{(]\s*([^,\s]+)\s*,").expect("valid entry pattern"))
}

fn doi_field() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bdoi\s*=\s*(?:\{((?:[^{}]|\{[^{}]*\})*)\}|"([^"]*)")"#)
            .expect("valid doi pattern")
    })
}

/// Read a bibliography file, choosing the parser by extension
pub fn read_bibliography(path: &Path) -> Result<Vec<BibEntry>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str) -> Vec<BibEntry> = match extension.as_deref() {
        Some("bib") => parse_bibtex,
        Some("txt") => parse_doi_list,
        _ => {
            return Err(GraphError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let content = std::fs::read_to_string(path).map_err(|source| GraphError::Bibliography {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = parse(&content);
    debug!(path = %path.display(), entries = entries.len(), "Bibliography read");
    Ok(entries)
}

/// Split BibTeX source into entries and pull out each `doi` field
pub fn parse_bibtex(content: &str) -> Vec<BibEntry> {
    let headers: Vec<_> = entry_header().captures_iter(content).collect();

    headers
        .iter()
        .enumerate()
        .filter(|(_, caps)| !NON_ENTRY_TYPES.contains(&caps[1].to_ascii_lowercase().as_str()))
        .map(|(i, caps)| {
            let start = caps.get(0).map_or(0, |m| m.end());
            let end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(content.len(), |m| m.start());
            let body = &content[start..end];

            let doi = doi_field()
                .captures(body)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .and_then(|m| normalize_doi(m.as_str()));

            BibEntry {
                key: caps[2].to_string(),
                doi,
            }
        })
        .collect()
}

/// One DOI per non-empty line; `#` starts a comment line
pub fn parse_doi_list(content: &str) -> Vec<BibEntry> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| BibEntry {
            key: format!("line {}", i + 1),
            doi: normalize_doi(line),
        })
        .collect()
}

/// Strip BibTeX braces, resolver prefixes and LaTeX escapes. Blank input
/// yields `None`.
pub fn normalize_doi(raw: &str) -> Option<String> {
    let unbraced: String = raw.chars().filter(|c| !matches!(c, '{' | '}')).collect();
    let mut doi = unbraced.trim();

    for prefix in DOI_PREFIXES {
        if doi.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix)) {
            doi = doi[prefix.len()..].trim_start();
            break;
        }
    }

    let doi = doi.replace(r"\_", "_").replace(r"\&", "&").replace(r"\%", "%");
    let doi = doi.trim();

    if doi.is_empty() {
        None
    } else {
        Some(doi.to_string())
    }
}
