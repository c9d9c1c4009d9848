//! CiteForge Common Library
//!
//! Shared code for the CiteForge pipeline including:
//! - Paper and relationship models
//! - Metadata service client and retry protocol
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod scholar;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use models::{EdgeKind, Membership, PaperRecord, RelationshipEdge};
pub use scholar::{MetadataResult, MetadataSource, RateLimitDecider, RateLimitDecision};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default metadata service endpoint
pub const DEFAULT_SCHOLAR_BASE_URL: &str = "https://api.semanticscholar.org/v1";
