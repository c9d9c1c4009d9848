//! Citation graph models
//!
//! In-memory entities shared by the aggregation and classification stages

mod paper;
mod relationship;

pub use paper::{Membership, PaperRecord};
pub use relationship::{EdgeKind, RelationshipEdge};
