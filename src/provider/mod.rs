//! Upstream performance audit provider.

pub mod pagespeed;

use crate::analysis::AuditDocument;
use crate::error::Result;
use crate::models::{Category, Strategy};
use async_trait::async_trait;

pub use pagespeed::{PageSpeedClient, PageSpeedConfig};

/// Runs one audit for one (url, category, strategy) combination.
#[async_trait]
pub trait AuditProvider: Send + Sync {
    async fn run_audit(
        &self,
        url: &str,
        category: Category,
        strategy: Strategy,
    ) -> Result<AuditDocument>;
}
