//! Metadata service abstraction
//!
//! Provides the boundary to the bibliographic metadata service:
//! - `MetadataSource`: one request per identifier, status already classified
//! - `SemanticScholarClient`: HTTP implementation
//! - `ScriptedSource`: replayable source for tests
//! - `Fetcher`: the retry/wait/abort protocol on top of any source

mod client;
mod fetcher;
mod raw;
mod scripted;

pub use client::SemanticScholarClient;
pub use fetcher::{Fetcher, MetadataResult, RateLimitDecider, RateLimitDecision, RetryPolicy, SkipReason};
pub use raw::{RawAuthor, RawPaper};
pub use scripted::ScriptedSource;

use crate::errors::Result;
use async_trait::async_trait;

/// Outcome of a single request to the service
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// 200 with a parsed record
    Found(Box<RawPaper>),
    /// 403, the service is throttling us
    RateLimited,
    /// Any other status
    Missing { status: u16 },
}

/// Trait for metadata lookups
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Issue exactly one request for `identifier`
    async fn lookup(&self, identifier: &str) -> Result<Lookup>;

    /// Source name for logging
    fn name(&self) -> &str;
}
