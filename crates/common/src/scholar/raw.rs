//! Raw metadata records as returned by the service
//!
//! Top-level responses and the embedded reference/citation stubs share one
//! shape. Every field is optional because stubs are frequently incomplete.

use serde::{Deserialize, Deserializer, Serialize};

/// Paper record in the service's wire format
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawPaper {
    #[serde(rename = "paperId", default)]
    pub paper_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<RawAuthor>,

    #[serde(default)]
    pub year: Option<u32>,

    #[serde(default)]
    pub doi: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Papers cited by this paper
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<RawPaper>,

    /// Papers citing this paper
    #[serde(default, deserialize_with = "null_as_default")]
    pub citations: Vec<RawPaper>,
}

/// Author entry, either a structured name record or a bare string
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawAuthor {
    Plain(String),
    Structured {
        #[serde(default, alias = "fullName")]
        name: Option<String>,
    },
}

impl RawAuthor {
    /// Display name, if the entry carries a non-blank one
    pub fn display_name(&self) -> Option<&str> {
        let name = match self {
            RawAuthor::Plain(name) => Some(name.as_str()),
            RawAuthor::Structured { name } => name.as_deref(),
        };
        name.map(str::trim).filter(|n| !n.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
