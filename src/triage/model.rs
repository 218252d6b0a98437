//! Trainable word-count text model.
//!
//! A small multinomial naive-Bayes model over word counts, shared by the
//! classifier and the prioritizer. A fitted model is immutable: the owning
//! component swaps a fresh [`Arc`] snapshot on retrain, so readers observe
//! either the old model or the new one, never a mix.

use std::collections::{HashMap, HashSet};

/// Splits text into lowercase alphanumeric tokens.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Per-label word statistics.
struct LabelStats<L> {
    label: L,
    examples: usize,
    word_counts: HashMap<String, usize>,
    total_words: usize,
}

/// An immutable fitted text model mapping text to a label of type `L`.
pub(crate) struct TextModel<L> {
    labels: Vec<LabelStats<L>>,
    vocabulary_size: usize,
    total_examples: usize,
}

impl<L: Copy + PartialEq> TextModel<L> {
    /// Fits a model from labeled examples.
    ///
    /// `label_order` fixes both the set of predictable labels and the
    /// tie-break order: when two labels score identically, the one listed
    /// earlier wins. Examples with labels outside `label_order` are ignored.
    pub fn fit<S: AsRef<str>>(examples: &[(S, L)], label_order: &[L]) -> Self {
        let mut labels: Vec<LabelStats<L>> = label_order
            .iter()
            .map(|&label| LabelStats {
                label,
                examples: 0,
                word_counts: HashMap::new(),
                total_words: 0,
            })
            .collect();
        let mut vocabulary: HashSet<String> = HashSet::new();
        let mut total_examples = 0;

        for (text, label) in examples {
            let Some(stats) = labels.iter_mut().find(|s| s.label == *label) else {
                continue;
            };
            stats.examples += 1;
            total_examples += 1;
            for token in tokenize(text.as_ref()) {
                vocabulary.insert(token.clone());
                *stats.word_counts.entry(token).or_insert(0) += 1;
                stats.total_words += 1;
            }
        }

        Self {
            labels,
            vocabulary_size: vocabulary.len(),
            total_examples,
        }
    }

    /// Whether the model saw any training examples.
    pub fn is_fitted(&self) -> bool {
        self.total_examples > 0
    }

    /// Predicts the most likely label for `text`, or `None` when the model
    /// saw no training examples.
    ///
    /// Scoring is in log space with Laplace smoothing. Labels are compared
    /// with a strictly-greater test in fit order, so equal scores resolve
    /// to the earlier label deterministically.
    pub fn predict(&self, text: &str) -> Option<L> {
        if !self.is_fitted() {
            return None;
        }

        let tokens = tokenize(text);
        let num_labels = self.labels.len() as f64;
        let smoothing = self.vocabulary_size as f64 + 1.0;

        let mut best: Option<(L, f64)> = None;
        for stats in &self.labels {
            let prior = (stats.examples as f64 + 1.0)
                / (self.total_examples as f64 + num_labels);
            let denominator = stats.total_words as f64 + smoothing;

            let mut score = prior.ln();
            for token in &tokens {
                let count = stats.word_counts.get(token).copied().unwrap_or(0);
                score += ((count as f64 + 1.0) / denominator).ln();
            }

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((stats.label, score)),
            }
        }

        best.map(|(label, _)| label)
    }
}
