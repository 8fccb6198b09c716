//! Process stage: consolidate raw audits into one report per strategy.

use crate::analysis::{
    extract_summary, fold_artifacts, group_by_identifier, group_by_strategy,
};
use crate::error::{Result, WorkerError};
use crate::models::{Operation, StageResult, StorageKeys, Strategy, StrategyResult};
use crate::storage::{merged_key, simplified_key, ArtifactStore, JSON_CONTENT_TYPE};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

const COLLECT_OUTPUT: &str = "collect stage output";

/// Find the storage keys the collect stage reported in the task sequence.
///
/// The payload may be a JSON array or the string it was serialized to.
pub fn collected_keys(sequence: &[StageResult]) -> Result<Vec<String>> {
    let stage = sequence
        .iter()
        .find(|s| s.name == Operation::Collect.as_str())
        .ok_or(WorkerError::MissingInput(COLLECT_OUTPUT))?;

    let keys = match &stage.output {
        Value::String(serialized) => serde_json::from_str::<Vec<String>>(serialized),
        other => serde_json::from_value::<Vec<String>>(other.clone()),
    };

    keys.map_err(|e| WorkerError::parse(COLLECT_OUTPUT, e))
}

/// Consolidate `references` for every strategy they cover.
///
/// Results come back in `Strategy::ALL` order. References naming no known
/// strategy are logged and left out.
pub async fn run_process(
    store: &dyn ArtifactStore,
    slug: &str,
    references: &[String],
    now: DateTime<Utc>,
) -> Result<Vec<StrategyResult>> {
    for (owner, refs) in &group_by_identifier(references) {
        if owner != slug {
            warn!(
                "{} reference(s) belong to {} rather than {}",
                refs.len(),
                owner,
                slug
            );
        }
    }

    let partition = group_by_strategy(references);

    for reference in &partition.unclassified {
        warn!("Ignoring {}: no strategy in reference", reference);
    }
    if partition.buckets.is_empty() {
        warn!("No artifacts to consolidate for {}", slug);
    }

    let strategies = Strategy::ALL
        .into_iter()
        .map(|strategy| (strategy, partition.bucket(strategy)))
        .filter(|(_, refs)| !refs.is_empty())
        .map(|(strategy, refs)| consolidate_strategy(store, slug, strategy, refs, now));

    try_join_all(strategies).await
}

/// Fetch, merge, summarize and persist one strategy's artifacts.
async fn consolidate_strategy(
    store: &dyn ArtifactStore,
    slug: &str,
    strategy: Strategy,
    references: &[String],
    now: DateTime<Utc>,
) -> Result<StrategyResult> {
    info!(
        "Consolidating {} {} artifacts for {}",
        references.len(),
        strategy,
        slug
    );

    let reads = references.iter().map(|key| async move {
        let bytes = store.get(key).await?;
        Ok::<_, WorkerError>((key.clone(), bytes))
    });
    let artifacts = try_join_all(reads).await?;

    let outcome = fold_artifacts(artifacts);
    debug!("Merged {} {} artifact(s)", outcome.merged.len(), strategy);
    if !outcome.skipped.is_empty() {
        warn!(
            "{} report for {} built without {} unreadable artifact(s)",
            strategy,
            slug,
            outcome.skipped.len()
        );
    }

    let full = merged_key(now, slug, strategy);
    store
        .put(&full, outcome.document.to_json_bytes()?, JSON_CONTENT_TYPE)
        .await?;

    let simplified_report = extract_summary(&outcome.document, strategy);
    let min = simplified_key(now, slug, strategy);
    store
        .put(
            &min,
            serde_json::to_vec(&simplified_report)?,
            JSON_CONTENT_TYPE,
        )
        .await?;

    info!("Stored {} and {}", full, min);

    Ok(StrategyResult {
        simplified_report,
        storage_keys: StorageKeys { full, min },
    })
}
