//! Classifier statistics

use serde::Serialize;

use crate::classifier::Classifier;

/// Summary of what a classifier has learned
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierStats {
    /// Total samples learned
    pub total_samples: u64,
    /// Number of known classes
    pub class_count: usize,
    /// Tokens present in at least one class
    pub vocabulary_size: usize,
    /// Per-class breakdown, in class order
    pub classes: Vec<ClassStats>,
}

/// Learned counts for a single class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStats {
    pub class: String,
    pub samples: u64,
    pub word_total: u64,
    pub distinct_words: u64,
    /// Fraction of all samples labeled with this class
    pub prior: f64,
}

impl Classifier {
    /// Summarize the learned state
    pub fn stats(&self) -> ClassifierStats {
        let total_samples = self.sample_count();

        let classes: Vec<ClassStats> = self
            .classes()
            .map(|class| {
                let samples = self.class_sample_count(class);
                ClassStats {
                    class: class.to_string(),
                    samples,
                    word_total: self.class_word_total(class),
                    distinct_words: self.class_distinct_word_count(class),
                    prior: if total_samples > 0 {
                        samples as f64 / total_samples as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect();

        ClassifierStats {
            total_samples,
            class_count: classes.len(),
            vocabulary_size: self.words().count(),
            classes,
        }
    }
}
