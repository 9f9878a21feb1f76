//! Classifier snapshots
//!
//! A [`Snapshot`] is the persisted form of a classifier: its five count
//! tables and nothing else. The tokenizer is a function, not data, so it
//! must be supplied again when restoring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::classifier::Classifier;
use crate::config::{ClassifierConfig, Settings};
use crate::error::{BayesError, Result};

/// Serializable state of a [`Classifier`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Snapshot {
    pub word_class_count: IndexMap<String, IndexMap<String, u64>>,
    pub class_word_total: IndexMap<String, u64>,
    pub class_distinct_word_count: IndexMap<String, u64>,
    pub class_sample_count: IndexMap<String, u64>,
    pub total_sample_count: u64,
}

impl Snapshot {
    /// Decode a snapshot from JSON
    ///
    /// Only the shape is checked. Use [`Snapshot::validate`] to check that
    /// the counts agree with each other.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BayesError::Deserialization(e.to_string()))
    }

    /// Encode the snapshot as compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode the snapshot as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the tables are consistent with each other
    pub fn validate(&self) -> Result<()> {
        let mut word_totals: BTreeMap<&str, u64> = BTreeMap::new();
        let mut distinct: BTreeMap<&str, u64> = BTreeMap::new();

        for per_class in self.word_class_count.values() {
            for (class, &count) in per_class {
                let total = word_totals.entry(class.as_str()).or_insert(0);
                *total = total.checked_add(count).ok_or_else(|| {
                    invalid(format!("word total of class '{}' overflows", class))
                })?;
                if count > 0 {
                    *distinct.entry(class.as_str()).or_insert(0) += 1;
                }
            }
        }

        let classes: BTreeSet<&str> = word_totals
            .keys()
            .copied()
            .chain(self.class_word_total.keys().map(String::as_str))
            .chain(self.class_distinct_word_count.keys().map(String::as_str))
            .collect();

        for class in classes {
            let expected = word_totals.get(class).copied().unwrap_or(0);
            let found = self.class_word_total.get(class).copied().unwrap_or(0);
            if expected != found {
                return Err(invalid(format!(
                    "classWordTotal of '{}' is {}, words sum to {}",
                    class, found, expected
                )));
            }

            let expected = distinct.get(class).copied().unwrap_or(0);
            let found = self.class_distinct_word_count.get(class).copied().unwrap_or(0);
            if expected != found {
                return Err(invalid(format!(
                    "classDistinctWordCount of '{}' is {}, {} words are present",
                    class, found, expected
                )));
            }
        }

        let mut samples: u64 = 0;
        for (class, &count) in &self.class_sample_count {
            if count == 0 {
                return Err(invalid(format!("classSampleCount of '{}' is zero", class)));
            }
            samples = samples
                .checked_add(count)
                .ok_or_else(|| invalid("sample counts overflow".to_string()))?;
        }

        if samples != self.total_sample_count {
            return Err(invalid(format!(
                "totalSampleCount is {}, class samples sum to {}",
                self.total_sample_count, samples
            )));
        }

        Ok(())
    }
}

fn invalid(reason: String) -> BayesError {
    BayesError::Deserialization(format!("inconsistent snapshot: {}", reason))
}

impl Classifier {
    /// Capture the learned state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            word_class_count: self.word_class_count.clone(),
            class_word_total: self.class_word_total.clone(),
            class_distinct_word_count: self.class_distinct_word_count.clone(),
            class_sample_count: self.class_sample_count.clone(),
            total_sample_count: self.total_sample_count,
        }
    }

    /// Build a classifier from a snapshot, trusting its counts as-is
    pub fn from_snapshot(snapshot: Snapshot, config: ClassifierConfig) -> Self {
        let mut classifier = Classifier::with_config(config);
        classifier.word_class_count = snapshot.word_class_count;
        classifier.class_word_total = snapshot.class_word_total;
        classifier.class_distinct_word_count = snapshot.class_distinct_word_count;
        classifier.class_sample_count = snapshot.class_sample_count;
        classifier.total_sample_count = snapshot.total_sample_count;

        info!(
            classes = classifier.class_sample_count.len(),
            vocabulary = classifier.word_class_count.len(),
            samples = classifier.total_sample_count,
            "Restored classifier from snapshot"
        );

        classifier
    }

    /// Serialize the learned state as JSON
    pub fn to_json(&self) -> Result<String> {
        self.snapshot().to_json()
    }

    /// Serialize the learned state as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        self.snapshot().to_json_pretty()
    }

    /// Restore a classifier from JSON, trusting the counts
    pub fn from_json(json: &str, config: ClassifierConfig) -> Result<Self> {
        Ok(Self::from_snapshot(Snapshot::from_json(json)?, config))
    }

    /// Restore a classifier from JSON, rejecting inconsistent counts
    pub fn from_json_validated(json: &str, config: ClassifierConfig) -> Result<Self> {
        let snapshot = Snapshot::from_json(json)?;
        snapshot.validate()?;
        Ok(Self::from_snapshot(snapshot, config))
    }

    /// Serialize according to the snapshot settings
    pub fn encode(&self, settings: &Settings) -> Result<String> {
        if settings.snapshot.pretty {
            self.to_json_pretty()
        } else {
            self.to_json()
        }
    }

    /// Restore according to the snapshot settings
    pub fn restore(json: &str, config: ClassifierConfig, settings: &Settings) -> Result<Self> {
        if settings.snapshot.validate_on_restore {
            Self::from_json_validated(json, config)
        } else {
            Self::from_json(json, config)
        }
    }
}
