//! Report consolidation engine.
//!
//! Deep merging of partial audit documents, grouping of artifact
//! references, and projection of merged reports into the simplified schema.

pub mod merge;
pub mod partition;
pub mod summary;

pub use merge::{fold_artifacts, AuditDocument};
pub use partition::{group_by_identifier, group_by_strategy};
pub use summary::extract_summary;
