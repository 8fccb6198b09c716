//! Deterministic storage keys.
//!
//! Layout is `scans/<year>/<month>/...` in UTC, month without zero padding.
//! Other services read these keys, so the format must not drift.

use crate::models::{Category, Strategy};
use chrono::{DateTime, Datelike, Utc};

const KEY_PREFIX: &str = "scans";

fn month_prefix(now: DateTime<Utc>) -> String {
    format!("{}/{}/{}", KEY_PREFIX, now.year(), now.month())
}

/// Key of one raw provider response.
pub fn raw_key(now: DateTime<Utc>, slug: &str, category: Category, strategy: Strategy) -> String {
    format!(
        "{}/{}.{}.{}.json",
        month_prefix(now),
        slug,
        category.as_str(),
        strategy.as_str()
    )
}

/// Key of the merged report for one strategy.
pub fn merged_key(now: DateTime<Utc>, slug: &str, strategy: Strategy) -> String {
    format!("{}/{}.{}.json", month_prefix(now), slug, strategy.as_str())
}

/// Key of the simplified report for one strategy.
pub fn simplified_key(now: DateTime<Utc>, slug: &str, strategy: Strategy) -> String {
    format!("{}/{}.{}.min.json", month_prefix(now), slug, strategy.as_str())
}
