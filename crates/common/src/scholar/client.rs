//! Semantic Scholar HTTP client

use super::{Lookup, MetadataSource, RawPaper};
use crate::config::ScholarConfig;
use crate::errors::Result;
use async_trait::async_trait;

/// Status classes the fetch protocol distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Success,
    RateLimited,
    Other,
}

pub(crate) fn classify_status(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::Success,
        403 => StatusClass::RateLimited,
        _ => StatusClass::Other,
    }
}

/// Paper lookup client keyed by DOI
pub struct SemanticScholarClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    /// Create a new client from configuration
    pub fn new(config: &ScholarConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("citeforge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Request URL for an identifier. DOIs keep their slashes.
    pub fn paper_url(&self, identifier: &str) -> String {
        format!("{}/paper/{}", self.base_url, identifier)
    }
}

#[async_trait]
impl MetadataSource for SemanticScholarClient {
    async fn lookup(&self, identifier: &str) -> Result<Lookup> {
        let url = self.paper_url(identifier);

        let mut request = self.client
            .get(&url)
            .header("Accept", "application/json");

        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        match classify_status(status) {
            StatusClass::Success => {
                let body = response.text().await?;
                let raw: RawPaper = serde_json::from_str(&body)?;
                Ok(Lookup::Found(Box::new(raw)))
            }
            StatusClass::RateLimited => Ok(Lookup::RateLimited),
            StatusClass::Other => {
                tracing::debug!(url = %url, status, "Metadata lookup returned non-success status");
                Ok(Lookup::Missing { status })
            }
        }
    }

    fn name(&self) -> &str {
        "semantic-scholar"
    }
}
