//! Combining fresh collection schemas with a persisted artifact

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CollectionEntry;

/// How fresh schemas combine with persisted ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Persisted field definitions win; fields only in the fresh schema are added
    #[default]
    Merge,
    /// Fresh schemas replace persisted ones for the analyzed collections
    Overwrite,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Merge => write!(f, "merge"),
            MergeStrategy::Overwrite => write!(f, "overwrite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown merge strategy '{0}', expected 'merge' or 'overwrite'")]
pub struct ParseMergeStrategyError(String);

impl FromStr for MergeStrategy {
    type Err = ParseMergeStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(MergeStrategy::Merge),
            "overwrite" => Ok(MergeStrategy::Overwrite),
            other => Err(ParseMergeStrategyError(other.to_string())),
        }
    }
}

/// Merge fresh collection entries into the persisted ones
///
/// Persisted collections that were not regenerated are always kept. For
/// regenerated collections, `Overwrite` takes the fresh entry as is, while
/// `Merge` takes the fresh description and keeps every persisted field
/// definition (and any hand-added keys) over the fresh one.
pub fn merge_collections(
    existing: BTreeMap<String, CollectionEntry>,
    fresh: BTreeMap<String, CollectionEntry>,
    strategy: MergeStrategy,
) -> BTreeMap<String, CollectionEntry> {
    let mut result = existing;

    for (name, fresh_entry) in fresh {
        let merged = match (strategy, result.remove(&name)) {
            (MergeStrategy::Merge, Some(persisted)) => merge_entry(persisted, fresh_entry),
            _ => fresh_entry,
        };
        result.insert(name, merged);
    }

    result
}

fn merge_entry(persisted: CollectionEntry, fresh: CollectionEntry) -> CollectionEntry {
    let mut fields = fresh.fields;
    fields.extend(persisted.fields);

    let mut extra = fresh.extra;
    extra.extend(persisted.extra);

    CollectionEntry {
        description: fresh.description,
        fields,
        extra,
    }
}
