//! Collect stage: run every audit and store the raw results.

use crate::error::{Result, WorkerError};
use crate::models::{Category, Strategy};
use crate::provider::AuditProvider;
use crate::storage::{raw_key, ArtifactStore, JSON_CONTENT_TYPE};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::info;

/// Every (category, strategy) pair, categories outermost.
pub fn audit_matrix() -> impl Iterator<Item = (Category, Strategy)> {
    Category::ALL
        .into_iter()
        .flat_map(|category| Strategy::ALL.into_iter().map(move |strategy| (category, strategy)))
}

/// Run all audits for `url` concurrently and persist each raw document.
///
/// Returns the storage keys in matrix order. Any provider or storage
/// failure aborts the whole stage.
pub async fn run_collect(
    provider: &dyn AuditProvider,
    store: &dyn ArtifactStore,
    slug: &str,
    url: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    let url = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(WorkerError::MissingInput("url"))?;

    info!("Collecting audits for {} ({})", slug, url);

    let audits = audit_matrix().map(|(category, strategy)| async move {
        let key = raw_key(now, slug, category, strategy);
        let document = provider.run_audit(url, category, strategy).await?;
        store
            .put(&key, document.to_json_bytes()?, JSON_CONTENT_TYPE)
            .await?;
        info!("Stored {}", key);
        Ok::<_, WorkerError>(key)
    });

    let keys = try_join_all(audits).await?;
    info!("Collected {} audits for {}", keys.len(), slug);
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_matrix_order() {
        let matrix: Vec<_> = audit_matrix().collect();
        assert_eq!(matrix.len(), 8);
        assert_eq!(matrix[0], (Category::Performance, Strategy::Mobile));
        assert_eq!(matrix[1], (Category::Performance, Strategy::Desktop));
        assert_eq!(matrix[2], (Category::Seo, Strategy::Mobile));
        assert_eq!(matrix[7], (Category::BestPractices, Strategy::Desktop));
    }
}
