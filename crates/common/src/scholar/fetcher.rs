//! Metadata fetch protocol
//!
//! One logical fetch per identifier. A rate-limit response asks the caller's
//! decider once (wait or abort); after a wait decision further rate-limit
//! responses are retried silently after a fixed delay until the request
//! budget is spent. Waits are not interruptible.

use super::{Lookup, MetadataSource, RawPaper};
use crate::config::ScholarConfig;
use crate::metrics::{self, FetchTimer};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a logical fetch
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataResult {
    /// The service returned the record
    Found(Box<RawPaper>),
    /// Skip this identifier and continue with the next one
    Skip(SkipReason),
    /// Stop processing entirely
    Abort,
}

/// Why an identifier was skipped
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Non-success status other than rate limiting
    NotFound { status: u16 },
    /// Still rate limited after the whole request budget
    RateLimitExhausted { attempts: u32 },
    /// No usable response (network, timeout, malformed body)
    Transport { message: String },
}

/// Caller decision on the first rate-limit response of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Wait,
    Abort,
}

/// Decision point consulted when the service starts rate limiting
#[async_trait]
pub trait RateLimitDecider: Send + Sync {
    async fn decide(&self, identifier: &str) -> RateLimitDecision;
}

/// A fixed decision acts as a non-interactive policy
#[async_trait]
impl RateLimitDecider for RateLimitDecision {
    async fn decide(&self, _identifier: &str) -> RateLimitDecision {
        *self
    }
}

/// Request budget and delay for rate-limited lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum requests per identifier
    pub max_attempts: u32,
    /// Fixed delay between rate-limited attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

impl From<&ScholarConfig> for RetryPolicy {
    fn from(config: &ScholarConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

/// Runs the fetch protocol against a metadata source
pub struct Fetcher<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: MetadataSource> Fetcher<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    #[cfg(any(test, feature = "test-util"))]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch metadata for one identifier
    pub async fn fetch(&self, identifier: &str, decider: &dyn RateLimitDecider) -> MetadataResult {
        let timer = FetchTimer::start();
        let mut attempts = 0u32;
        let mut consulted = false;

        loop {
            attempts += 1;

            let lookup = match self.source.lookup(identifier).await {
                Ok(lookup) => lookup,
                Err(e) => {
                    warn!(doi = %identifier, source = self.source.name(), error = %e, "Metadata lookup failed");
                    timer.finish("transport");
                    return MetadataResult::Skip(SkipReason::Transport {
                        message: e.to_string(),
                    });
                }
            };

            match lookup {
                Lookup::Found(raw) => {
                    debug!(doi = %identifier, attempts, "Metadata found");
                    timer.finish("found");
                    return MetadataResult::Found(raw);
                }
                Lookup::Missing { status } => {
                    info!(doi = %identifier, status, "Paper was not found in database");
                    timer.finish("not_found");
                    return MetadataResult::Skip(SkipReason::NotFound { status });
                }
                Lookup::RateLimited => {
                    if !consulted {
                        consulted = true;
                        if decider.decide(identifier).await == RateLimitDecision::Abort {
                            info!(doi = %identifier, "Rate limited, stopping on request");
                            timer.finish("aborted");
                            return MetadataResult::Abort;
                        }
                    }

                    if attempts >= self.policy.max_attempts {
                        warn!(doi = %identifier, attempts, "Still rate limited, giving up on this paper");
                        timer.finish("exhausted");
                        return MetadataResult::Skip(SkipReason::RateLimitExhausted { attempts });
                    }

                    warn!(
                        doi = %identifier,
                        attempt = attempts,
                        max_attempts = self.policy.max_attempts,
                        delay_secs = self.policy.delay.as_secs_f64(),
                        "Access denied, sleeping before retry"
                    );
                    metrics::record_rate_limit_wait();
                    tokio::time::sleep(self.policy.delay).await;
                }
            }
        }
    }
}
