//! Multinomial naive Bayes classifier
//!
//! Learns word frequencies per class from labeled samples, supports
//! unlearning previously seen samples, and classifies text by the class with
//! the highest joint log-likelihood. Word likelihoods use Laplace (add-one)
//! smoothing and all arithmetic happens in log space.

use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::ClassifierConfig;
use crate::error::{BayesError, Result};
use crate::tokenizer::Tokenizer;

/// Incremental naive Bayes text classifier
#[derive(Clone)]
pub struct Classifier {
    /// Occurrences of a token per class
    pub(crate) word_class_count: IndexMap<String, IndexMap<String, u64>>,
    /// Token occurrences per class, repeats included
    pub(crate) class_word_total: IndexMap<String, u64>,
    /// Tokens with a positive count per class
    pub(crate) class_distinct_word_count: IndexMap<String, u64>,
    /// Samples per class, a class is known iff it has an entry here.
    /// Insertion order is the class enumeration order.
    pub(crate) class_sample_count: IndexMap<String, u64>,
    pub(crate) total_sample_count: u64,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Classifier {
    /// Create a classifier with the default tokenizer
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier from the given configuration
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self {
            word_class_count: IndexMap::new(),
            class_word_total: IndexMap::new(),
            class_distinct_word_count: IndexMap::new(),
            class_sample_count: IndexMap::new(),
            total_sample_count: 0,
            tokenizer: config.tokenizer,
        }
    }

    /// Create a classifier with a custom tokenizer
    pub fn with_tokenizer(tokenizer: impl Tokenizer + 'static) -> Self {
        Self::with_config(ClassifierConfig::default().tokenizer(tokenizer))
    }

    /// Tokenize text with the configured tokenizer
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(text)
    }

    /// Learn a text-class pair
    pub fn learn(&mut self, text: &str, class: &str) {
        let tokens = self.tokenize(text);
        self.learn_tokens(&tokens, class);
    }

    /// Learn an already tokenized sample
    pub fn learn_tokens<S: AsRef<str>>(&mut self, tokens: &[S], class: &str) {
        for token in tokens {
            let per_class = self
                .word_class_count
                .entry(token.as_ref().to_string())
                .or_default();

            if increment(per_class, class) == 1 {
                increment(&mut self.class_distinct_word_count, class);
            }
            increment(&mut self.class_word_total, class);
        }

        increment(&mut self.class_sample_count, class);
        self.total_sample_count += 1;

        debug!(class, tokens = tokens.len(), "Learned sample");
    }

    /// Unlearn a previously learned text-class pair
    ///
    /// The sample must have been learned with the same tokenization and not
    /// unlearned since. A sample that cannot be removed is rejected with
    /// [`BayesError::Precondition`] before any count is touched.
    pub fn unlearn(&mut self, text: &str, class: &str) -> Result<()> {
        let tokens = self.tokenize(text);
        self.unlearn_tokens(&tokens, class)
    }

    /// Unlearn an already tokenized sample
    pub fn unlearn_tokens<S: AsRef<str>>(&mut self, tokens: &[S], class: &str) -> Result<()> {
        self.check_unlearn(tokens, class).inspect_err(|e| {
            warn!(class, error = %e, "Rejected unlearn");
        })?;

        for token in tokens {
            let Some(per_class) = self.word_class_count.get_mut(token.as_ref()) else {
                continue;
            };

            // Zero cells stay in place, they only stop counting as distinct words
            if decrement(per_class, class) == 0 {
                decrement(&mut self.class_distinct_word_count, class);
            }
            decrement(&mut self.class_word_total, class);
        }

        // A class learned again later is enumerated last
        if decrement(&mut self.class_sample_count, class) == 0 {
            self.class_sample_count.shift_remove(class);
        }
        self.total_sample_count = self.total_sample_count.saturating_sub(1);

        debug!(class, tokens = tokens.len(), "Unlearned sample");
        Ok(())
    }

    /// Verify that every count touched by an unlearn can be decremented
    fn check_unlearn<S: AsRef<str>>(&self, tokens: &[S], class: &str) -> Result<()> {
        if self.class_sample_count(class) == 0 || self.total_sample_count == 0 {
            return Err(BayesError::Precondition(format!(
                "class '{}' has no learned samples",
                class
            )));
        }

        let mut required: BTreeMap<&str, u64> = BTreeMap::new();
        for token in tokens {
            *required.entry(token.as_ref()).or_insert(0) += 1;
        }

        for (token, needed) in required {
            let available = self.word_count(token, class);
            if available < needed {
                return Err(BayesError::Precondition(format!(
                    "token '{}' occurs {} time(s) in class '{}', cannot remove {}",
                    token, available, class, needed
                )));
            }
        }

        if self.class_word_total(class) < tokens.len() as u64 {
            return Err(BayesError::Precondition(format!(
                "class '{}' holds fewer than {} words",
                class,
                tokens.len()
            )));
        }

        Ok(())
    }

    /// Estimate a score relating a token sequence to a class
    ///
    /// The score is the unnormalized joint log-likelihood
    /// `ln P(class) + Σ ln P(token | class)`. It is only comparable across
    /// classes for the same token sequence.
    ///
    /// A class that has samples but never observed a word scores every token
    /// as ln 1 = 0, so it outranks any class with words on non-empty input.
    pub fn estimate_with_tokens<S: AsRef<str>>(&self, tokens: &[S], class: &str) -> Result<f64> {
        match self.class_sample_count.get(class) {
            Some(&samples) if samples > 0 && self.total_sample_count > 0 => {
                Ok(self.log_score(tokens, class, samples))
            }
            _ => Err(BayesError::UnknownClass(class.to_string())),
        }
    }

    /// Estimate a length-normalized score relating a text to a class
    pub fn estimate(&self, text: &str, class: &str) -> Result<f64> {
        let tokens = self.tokenize(text);
        let score = self.estimate_with_tokens(&tokens, class)?;

        if tokens.is_empty() {
            return Err(BayesError::EmptyInput);
        }

        Ok(score / tokens.len() as f64)
    }

    /// Classify a text, returning the most likely class
    ///
    /// Classes are visited in the order they were first learned and only a
    /// strictly greater score replaces the current best, so ties keep the
    /// earliest class.
    pub fn classify(&self, text: &str) -> Result<String> {
        let tokens = self.tokenize(text);
        let mut best: Option<(&str, f64)> = None;

        for (class, samples) in self.scorable_classes() {
            let score = self.log_score(&tokens, class, samples);
            trace!(class, score, "Class score");

            if best.map_or(true, |(_, max)| score > max) {
                best = Some((class, score));
            }
        }

        let (class, score) = best.ok_or(BayesError::EmptyModel)?;
        debug!(class, score, tokens = tokens.len(), "Classified text");

        Ok(class.to_string())
    }

    /// Score a text against every known class, best first
    pub fn classify_with_scores(&self, text: &str) -> Result<Vec<(String, f64)>> {
        let tokens = self.tokenize(text);
        let mut scores: Vec<(String, f64)> = self
            .scorable_classes()
            .map(|(class, samples)| (class.to_string(), self.log_score(&tokens, class, samples)))
            .collect();

        if scores.is_empty() {
            return Err(BayesError::EmptyModel);
        }

        // Stable sort keeps class order among equal scores
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scores)
    }

    /// Classes with samples, none when the sample total is zero
    fn scorable_classes(&self) -> impl Iterator<Item = (&str, u64)> {
        let has_samples = self.total_sample_count > 0;
        self.class_sample_count
            .iter()
            .filter(move |(_, samples)| has_samples && **samples > 0)
            .map(|(class, &samples)| (class.as_str(), samples))
    }

    fn log_score<S: AsRef<str>>(&self, tokens: &[S], class: &str, samples: u64) -> f64 {
        let mut score = (samples as f64 / self.total_sample_count as f64).ln();

        // Laplace smoothing. A class that never saw a word would otherwise
        // divide by zero, flooring at one makes each token a neutral factor.
        let denominator = self
            .class_word_total(class)
            .saturating_add(self.class_distinct_word_count(class))
            .max(1) as f64;

        for token in tokens {
            let observed = self.word_count(token.as_ref(), class);
            score += ((observed as f64 + 1.0) / denominator).ln();
        }

        score
    }

    /// Total number of learned samples
    pub fn sample_count(&self) -> u64 {
        self.total_sample_count
    }

    /// Known classes, in the order they were first learned
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_sample_count.keys().map(String::as_str)
    }

    /// Tokens currently present in at least one class
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.word_class_count
            .iter()
            .filter(|(_, per_class)| per_class.values().any(|&count| count > 0))
            .map(|(token, _)| token.as_str())
    }

    /// Whether the class has at least one learned sample
    pub fn has_class(&self, class: &str) -> bool {
        self.class_sample_count.contains_key(class)
    }

    /// Whether no sample has been learned
    pub fn is_empty(&self) -> bool {
        self.total_sample_count == 0
    }

    /// Samples learned under a class
    pub fn class_sample_count(&self, class: &str) -> u64 {
        self.class_sample_count.get(class).copied().unwrap_or(0)
    }

    /// Token occurrences learned under a class, repeats included
    pub fn class_word_total(&self, class: &str) -> u64 {
        self.class_word_total.get(class).copied().unwrap_or(0)
    }

    /// Distinct tokens currently present in a class
    pub fn class_distinct_word_count(&self, class: &str) -> u64 {
        self.class_distinct_word_count.get(class).copied().unwrap_or(0)
    }

    /// Occurrences of a token in a class
    pub fn word_count(&self, token: &str, class: &str) -> u64 {
        self.word_class_count
            .get(token)
            .and_then(|per_class| per_class.get(class))
            .copied()
            .unwrap_or(0)
    }

    /// Forget everything learned, keeping the tokenizer
    pub fn clear(&mut self) {
        self.word_class_count.clear();
        self.class_word_total.clear();
        self.class_distinct_word_count.clear();
        self.class_sample_count.clear();
        self.total_sample_count = 0;
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("classes", &self.class_sample_count)
            .field("vocabulary", &self.word_class_count.len())
            .field("total_sample_count", &self.total_sample_count)
            .finish_non_exhaustive()
    }
}

fn increment(map: &mut IndexMap<String, u64>, key: &str) -> u64 {
    match map.get_mut(key) {
        Some(count) => {
            *count += 1;
            *count
        }
        None => {
            map.insert(key.to_string(), 1);
            1
        }
    }
}

fn decrement(map: &mut IndexMap<String, u64>, key: &str) -> u64 {
    match map.get_mut(key) {
        Some(count) => {
            *count = count.saturating_sub(1);
            *count
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distinct_positive(classifier: &Classifier, class: &str) -> u64 {
        classifier
            .word_class_count
            .values()
            .filter(|per_class| per_class.get(class).copied().unwrap_or(0) > 0)
            .count() as u64
    }

    #[test]
    fn test_new_classifier_is_empty() {
        let classifier = Classifier::new();
        assert!(classifier.is_empty());
        assert_eq!(classifier.sample_count(), 0);
        assert_eq!(classifier.classes().count(), 0);
        assert_eq!(classifier.words().count(), 0);
    }

    #[test]
    fn test_learn() {
        let mut classifier = Classifier::new();
        classifier.learn("text", "label");

        assert_eq!(classifier.sample_count(), 1);
        assert_eq!(classifier.classes().collect::<Vec<_>>(), vec!["label"]);
        assert_eq!(classifier.words().collect::<Vec<_>>(), vec!["text"]);
    }

    #[test]
    fn test_sample_accounting() {
        let mut classifier = Classifier::new();
        classifier.learn("cheap pills", "spam");
        classifier.learn("cheap watches", "spam");
        classifier.learn("meeting tomorrow", "ham");
        classifier.learn("cheap pills", "spam");

        assert_eq!(classifier.class_sample_count("spam"), 3);
        assert_eq!(classifier.class_sample_count("ham"), 1);
        assert_eq!(classifier.sample_count(), 4);
    }

    #[test]
    fn test_word_accounting() {
        let mut classifier = Classifier::new();
        classifier.learn("buy buy buy now", "spam");
        classifier.learn("buy later", "spam");
        classifier.learn("buy milk", "ham");

        assert_eq!(classifier.word_count("buy", "spam"), 4);
        assert_eq!(classifier.word_count("buy", "ham"), 1);
        assert_eq!(classifier.word_count("now", "ham"), 0);
        assert_eq!(classifier.word_count("unseen", "spam"), 0);
        assert_eq!(classifier.class_word_total("spam"), 6);
        assert_eq!(classifier.class_word_total("ham"), 2);
        assert_eq!(classifier.class_distinct_word_count("spam"), 3);
        assert_eq!(classifier.class_distinct_word_count("ham"), 2);
    }

    #[test]
    fn test_distinct_count_tracks_transitions() {
        let mut classifier = Classifier::new();
        let steps = [("a b a", "x"), ("b c", "x"), ("c d", "y")];

        for (text, class) in steps {
            classifier.learn(text, class);
            for class in ["x", "y"] {
                assert_eq!(
                    classifier.class_distinct_word_count(class),
                    distinct_positive(&classifier, class)
                );
            }
        }

        for (text, class) in steps {
            classifier.unlearn(text, class).unwrap();
            for class in ["x", "y"] {
                assert_eq!(
                    classifier.class_distinct_word_count(class),
                    distinct_positive(&classifier, class)
                );
            }
        }
    }

    #[test]
    fn test_empty_text_counts_as_sample() {
        let mut classifier = Classifier::new();
        classifier.learn(" ?! ", "empty");

        assert_eq!(classifier.class_sample_count("empty"), 1);
        assert_eq!(classifier.class_word_total("empty"), 0);
        assert_eq!(classifier.words().count(), 0);
    }

    #[test]
    fn test_unlearn_removes_class() {
        let mut classifier = Classifier::new();
        classifier.learn("hello world", "greeting");
        classifier.unlearn("hello world", "greeting").unwrap();

        assert!(!classifier.has_class("greeting"));
        assert!(classifier.is_empty());
        assert_eq!(classifier.class_word_total("greeting"), 0);
        assert_eq!(classifier.class_distinct_word_count("greeting"), 0);
        assert_eq!(classifier.words().count(), 0);

        // Zero cells are kept structurally
        assert_eq!(classifier.word_class_count["hello"]["greeting"], 0);
    }

    #[test]
    fn test_unlearn_unknown_class_is_rejected() {
        let mut classifier = Classifier::new();
        classifier.learn("hello", "greeting");

        let result = classifier.unlearn("hello", "farewell");
        assert!(matches!(result, Err(BayesError::Precondition(_))));
        assert_eq!(classifier.sample_count(), 1);
    }

    #[test]
    fn test_double_unlearn_is_rejected_atomically() {
        let mut classifier = Classifier::new();
        classifier.learn("a b", "x");
        classifier.learn("a", "x");
        classifier.unlearn("a b", "x").unwrap();

        let before = classifier.clone();
        let result = classifier.unlearn("a b", "x");
        assert!(matches!(result, Err(BayesError::Precondition(_))));

        assert_eq!(classifier.word_class_count, before.word_class_count);
        assert_eq!(classifier.class_word_total, before.class_word_total);
        assert_eq!(
            classifier.class_distinct_word_count,
            before.class_distinct_word_count
        );
        assert_eq!(classifier.class_sample_count, before.class_sample_count);
        assert_eq!(classifier.total_sample_count, before.total_sample_count);
    }

    #[test]
    fn test_unlearn_counts_repeated_tokens() {
        let mut classifier = Classifier::new();
        classifier.learn("spam", "x");

        let result = classifier.unlearn("spam spam", "x");
        assert!(matches!(result, Err(BayesError::Precondition(_))));
        assert_eq!(classifier.word_count("spam", "x"), 1);
    }

    #[test]
    fn test_estimate_with_tokens_formula() {
        let mut classifier = Classifier::new();
        classifier.learn("a a b", "x");
        classifier.learn("c", "y");

        // prior 1/2, word total 3, distinct 2
        let expected = (0.5f64).ln() + (3.0f64 / 5.0).ln() + (1.0f64 / 5.0).ln();
        let score = classifier.estimate_with_tokens(&["a", "z"], "x").unwrap();
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_normalizes_by_length() {
        let mut classifier = Classifier::new();
        classifier.learn("a b", "x");

        let raw = classifier.estimate_with_tokens(&["a", "b", "c"], "x").unwrap();
        let normalized = classifier.estimate("a b c", "x").unwrap();
        assert!((normalized - raw / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_prefers_seen_text() {
        let mut classifier = Classifier::new();
        classifier.learn("text", "label");

        assert!(
            classifier.estimate("text", "label").unwrap()
                > classifier.estimate("text2", "label").unwrap()
        );
    }

    #[test]
    fn test_estimate_unknown_class() {
        let mut classifier = Classifier::new();
        assert!(matches!(
            classifier.estimate("text", "label"),
            Err(BayesError::UnknownClass(_))
        ));

        classifier.learn("text", "label");
        assert!(matches!(
            classifier.estimate("text", "other"),
            Err(BayesError::UnknownClass(class)) if class == "other"
        ));
    }

    #[test]
    fn test_estimate_empty_input() {
        let mut classifier = Classifier::new();
        classifier.learn("text", "label");
        assert!(matches!(
            classifier.estimate(" !! ", "label"),
            Err(BayesError::EmptyInput)
        ));
    }

    #[test]
    fn test_wordless_class_scores_are_finite() {
        let mut classifier = Classifier::new();
        classifier.learn("", "silent");
        classifier.learn("words here", "chatty");

        let score = classifier.estimate("words", "silent").unwrap();
        assert!(score.is_finite());
    }

    #[test]
    fn test_classify() {
        let mut classifier = Classifier::new();
        classifier.learn("a b c", "label1");
        classifier.learn("d e f", "label2");

        assert_eq!(classifier.classify("b c a").unwrap(), "label1");
        assert_eq!(classifier.classify("f e").unwrap(), "label2");
    }

    #[test]
    fn test_classify_empty_model() {
        let classifier = Classifier::new();
        assert!(matches!(
            classifier.classify("anything"),
            Err(BayesError::EmptyModel)
        ));
        assert!(matches!(
            classifier.classify_with_scores("anything"),
            Err(BayesError::EmptyModel)
        ));
    }

    #[test]
    fn test_classify_tie_keeps_first_learned_class() {
        let mut classifier = Classifier::new();
        classifier.learn("same", "beta");
        classifier.learn("same", "alpha");

        assert_eq!(classifier.classify("same").unwrap(), "beta");
        assert_eq!(classifier.classify("").unwrap(), "beta");
        assert_eq!(classifier.classes().collect::<Vec<_>>(), vec!["beta", "alpha"]);
    }

    #[test]
    fn test_relearned_class_is_enumerated_last() {
        let mut classifier = Classifier::new();
        classifier.learn("same", "beta");
        classifier.learn("same", "alpha");
        classifier.unlearn("same", "beta").unwrap();
        classifier.learn("same", "beta");

        assert_eq!(classifier.classes().collect::<Vec<_>>(), vec!["alpha", "beta"]);
        assert_eq!(classifier.classify("same").unwrap(), "alpha");

        let scores = classifier.classify_with_scores("same").unwrap();
        assert_eq!(scores[0].0, "alpha");
        assert_eq!(scores[1].0, "beta");
    }

    #[test]
    fn test_classify_rejects_zero_sample_total() {
        let mut classifier = Classifier::new();
        classifier.learn("text", "label");
        classifier.total_sample_count = 0;

        assert!(matches!(
            classifier.classify("text"),
            Err(BayesError::EmptyModel)
        ));
        assert!(matches!(
            classifier.classify_with_scores("text"),
            Err(BayesError::EmptyModel)
        ));
        assert!(matches!(
            classifier.estimate_with_tokens(&["text"], "label"),
            Err(BayesError::UnknownClass(_))
        ));
    }

    #[test]
    fn test_wordless_class_wins_non_empty_text() {
        let mut classifier = Classifier::new();
        classifier.learn("words here", "chatty");
        classifier.learn("", "silent");

        assert_eq!(classifier.estimate_with_tokens(&["words"], "silent").unwrap(), 0.5f64.ln());
        assert_eq!(classifier.classify("words").unwrap(), "silent");
    }

    #[test]
    fn test_classify_empty_text_uses_prior() {
        let mut classifier = Classifier::new();
        classifier.learn("x", "rare");
        classifier.learn("y", "common");
        classifier.learn("z", "common");

        assert_eq!(classifier.classify("").unwrap(), "common");
    }

    #[test]
    fn test_classify_with_scores_is_sorted() {
        let mut classifier = Classifier::new();
        classifier.learn("red apple", "fruit");
        classifier.learn("red car", "vehicle");
        classifier.learn("fast car", "vehicle");

        let scores = classifier.classify_with_scores("fast red car").unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].0, "vehicle");
        assert!(scores[0].1 >= scores[1].1);
        assert_eq!(scores[0].0, classifier.classify("fast red car").unwrap());
    }

    #[test]
    fn test_unlearn_flips_classification() {
        let mut classifier = Classifier::new();
        classifier.learn("text", "label");
        classifier.learn("text2", "label2");

        let before = classifier.classify("text").unwrap();
        classifier.unlearn("text", "label").unwrap();
        let after = classifier.classify("text").unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_custom_tokenizer_is_used() {
        let mut classifier = Classifier::with_tokenizer(|text: &str| {
            text.split(';').map(str::to_string).collect::<Vec<_>>()
        });
        classifier.learn("Hello World;Hello World", "x");

        assert_eq!(classifier.word_count("Hello World", "x"), 2);
        assert_eq!(classifier.tokenize("a;b"), vec!["a", "b"]);
    }

    #[test]
    fn test_clear() {
        let mut classifier = Classifier::new();
        classifier.learn("a b", "x");
        classifier.clear();

        assert!(classifier.is_empty());
        assert_eq!(classifier.classes().count(), 0);
        assert_eq!(classifier.words().count(), 0);
        assert_eq!(classifier.class_word_total("x"), 0);
    }
}
