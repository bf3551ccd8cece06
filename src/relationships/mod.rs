//! Relationship detection between analyzed collections
//!
//! - Foreign keys: fields named like `<target>_id` validated against the target's `_id`
//! - Correlations: indexed string fields shared across collections with overlapping values
//!
//! Both detectors are best-effort: store failures during validation are logged
//! and count as "no relationship".

mod correlations;
mod foreign_keys;
mod types;

pub use correlations::{CorrelationDetector, is_correlation_candidate};
pub use foreign_keys::{ForeignKeyDetector, find_target_collection, is_foreign_key_candidate};
pub use types::{
    Correlation, CorrelationTag, Link, Relationship, RelationshipType, RelationshipsSection,
    round_confidence,
};
