//! bayes-rs: Incremental naive Bayes text classifier
//!
//! A multinomial naive Bayes classifier that learns word frequencies per
//! class one sample at a time, can unlearn samples it has seen, and persists
//! its state as a JSON snapshot.
//!
//! # Features
//!
//! - **Online learning**: `learn` / `unlearn` update counts in place
//! - **Log-space scoring**: Laplace-smoothed likelihoods summed as logarithms
//! - **Pluggable tokenization**: any [`Tokenizer`] or closure
//! - **Snapshots**: whitelisted JSON encoding of the learned tables
//!
//! # Example
//!
//! ```
//! use bayes_rs::{Classifier, ClassifierConfig};
//!
//! let mut classifier = Classifier::new();
//! classifier.learn("a b c", "label1");
//! classifier.learn("d e f", "label2");
//! assert_eq!(classifier.classify("b c a")?, "label1");
//!
//! let json = classifier.to_json()?;
//! let restored = Classifier::from_json(&json, ClassifierConfig::default())?;
//! assert_eq!(restored.classify("e f")?, "label2");
//! # Ok::<(), bayes_rs::BayesError>(())
//! ```
//!
//! # Modules
//!
//! - [`classifier`]: The classifier model
//! - [`tokenizer`]: Tokenizer trait and default implementation
//! - [`snapshot`]: Serializable classifier state
//! - [`stats`]: Learned-state summaries
//! - [`config`]: Construction options and settings
//! - [`error`]: Error types and handling

pub mod classifier;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod stats;
pub mod tokenizer;

// Re-export commonly used types
pub use classifier::Classifier;
pub use config::{ClassifierConfig, Settings, SnapshotSettings};
pub use error::{BayesError, Result};
pub use snapshot::Snapshot;
pub use stats::{ClassStats, ClassifierStats};
pub use tokenizer::{DefaultTokenizer, Tokenizer};
