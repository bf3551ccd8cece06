//! Configuration for schema inference and relationship detection

use serde::{Deserialize, Serialize};

use super::InferenceError;

/// Confidence a foreign-key candidate must exceed to be reported
pub const RELATIONSHIP_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Confidence a correlation field must exceed to be reported
pub const CORRELATION_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Configuration for schema inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceConfig {
    /// Maximum number of documents to sample per collection
    pub sample_size: usize,

    /// Maximum number of sample values kept per field
    pub max_sample_values: usize,

    /// Largest distinct-value count still reported as an enumeration
    pub max_enum_values: usize,

    /// Detect enumerations on string fields
    pub detect_enums: bool,

    /// Record an example value per field
    pub collect_examples: bool,

    /// Recurse into embedded documents, recording `parent.child` fields
    pub flatten_nested: bool,

    /// Maximum nesting depth followed when flattening
    pub max_depth: usize,

    /// Foreign-key confidence threshold (exclusive)
    pub relationship_threshold: f64,

    /// Correlation confidence threshold (exclusive)
    pub correlation_threshold: f64,

    /// Source documents inspected when validating a foreign key
    pub fk_sample_documents: usize,

    /// Values checked against the target collection per foreign key
    pub fk_check_values: usize,

    /// Values sampled from the first collection when validating a correlation
    pub correlation_sample_values: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            max_sample_values: 100,
            max_enum_values: 10,
            detect_enums: true,
            collect_examples: true,
            flatten_nested: false,
            max_depth: 10,
            relationship_threshold: RELATIONSHIP_CONFIDENCE_THRESHOLD,
            correlation_threshold: CORRELATION_CONFIDENCE_THRESHOLD,
            fk_sample_documents: 50,
            fk_check_values: 20,
            correlation_sample_values: 20,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }

    /// Structure-only configuration: types and flags, no enums or examples
    pub fn structure_only() -> Self {
        Self {
            detect_enums: false,
            collect_examples: false,
            ..Self::default()
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.sample_size == 0 {
            return Err(InferenceError::InvalidConfig(
                "sample size must be at least 1".to_string(),
            ));
        }
        if self.fk_check_values == 0 || self.correlation_sample_values == 0 {
            return Err(InferenceError::InvalidConfig(
                "validation value counts must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("relationship threshold", self.relationship_threshold),
            ("correlation threshold", self.correlation_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(InferenceError::InvalidConfig(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the per-collection sample size
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Set the cap on stored sample values per field
    pub fn max_sample_values(mut self, max: usize) -> Self {
        self.config.max_sample_values = max;
        self
    }

    /// Set the largest distinct count reported as an enumeration
    pub fn max_enum_values(mut self, max: usize) -> Self {
        self.config.max_enum_values = max;
        self
    }

    /// Enable or disable enumeration detection
    pub fn detect_enums(mut self, detect: bool) -> Self {
        self.config.detect_enums = detect;
        self
    }

    /// Enable or disable example collection
    pub fn collect_examples(mut self, collect: bool) -> Self {
        self.config.collect_examples = collect;
        self
    }

    /// Enable or disable nested-field flattening
    pub fn flatten_nested(mut self, flatten: bool) -> Self {
        self.config.flatten_nested = flatten;
        self
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the foreign-key confidence threshold
    pub fn relationship_threshold(mut self, threshold: f64) -> Self {
        self.config.relationship_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the correlation confidence threshold
    pub fn correlation_threshold(mut self, threshold: f64) -> Self {
        self.config.correlation_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set how many source documents are inspected per foreign key
    pub fn fk_sample_documents(mut self, count: usize) -> Self {
        self.config.fk_sample_documents = count;
        self
    }

    /// Set how many values are checked per foreign key
    pub fn fk_check_values(mut self, count: usize) -> Self {
        self.config.fk_check_values = count;
        self
    }

    /// Set how many values are sampled per correlation field
    pub fn correlation_sample_values(mut self, count: usize) -> Self {
        self.config.correlation_sample_values = count;
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.sample_size, 100);
        assert_eq!(config.max_enum_values, 10);
        assert!(config.detect_enums);
        assert!(!config.flatten_nested);
        assert_eq!(config.relationship_threshold, 0.8);
        assert_eq!(config.correlation_threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = InferenceConfig::builder()
            .sample_size(500)
            .detect_enums(false)
            .flatten_nested(true)
            .max_depth(3)
            .build();

        assert_eq!(config.sample_size, 500);
        assert!(!config.detect_enums);
        assert!(config.flatten_nested);
        assert_eq!(config.max_depth, 3);
    }

    #[test]
    fn test_threshold_clamping() {
        let config = InferenceConfig::builder()
            .relationship_threshold(1.5)
            .correlation_threshold(-0.2)
            .build();

        assert_eq!(config.relationship_threshold, 1.0);
        assert_eq!(config.correlation_threshold, 0.0);
    }

    #[test]
    fn test_zero_sample_size_rejected() {
        let config = InferenceConfig::builder().sample_size(0).build();
        assert!(matches!(
            config.validate(),
            Err(InferenceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_structure_only() {
        let config = InferenceConfig::structure_only();
        assert!(!config.detect_enums);
        assert!(!config.collect_examples);
        assert_eq!(config.sample_size, 100);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: InferenceConfig =
            serde_json::from_str(r#"{"sampleSize": 25, "flattenNested": true}"#).unwrap();
        assert_eq!(config.sample_size, 25);
        assert!(config.flatten_nested);
        assert_eq!(config.fk_check_values, 20);
    }
}
