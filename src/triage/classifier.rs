//! Message category classifier.
//!
//! Maps raw message text to one of the closed [`Category`] labels. Until
//! trained, a deterministic keyword fallback decides, so classification
//! never fails with "model absent". Retraining builds a complete model and
//! swaps it in atomically.

use std::sync::{Arc, RwLock};

use super::corpus::TrainingExample;
use super::model::TextModel;
use crate::domain::Category;

/// Keyword fallback tables, checked in [`Category::TIE_BREAK_ORDER`]
/// (spam, work, personal; general is the terminal default). Matching is
/// plain substring containment on the lowercased text.
const SPAM_KEYWORDS: &[&str] = &[
    "winner",
    "lottery",
    "prize",
    "click here",
    "unsubscribe",
    "free offer",
    "crypto",
    "act now",
];

const WORK_KEYWORDS: &[&str] = &[
    "deadline",
    "project",
    "meeting",
    "report",
    "client",
    "invoice",
    "schedule",
    "review",
];

const PERSONAL_KEYWORDS: &[&str] = &[
    "coffee",
    "dinner",
    "movie",
    "weekend",
    "party",
    "birthday",
    "family",
    "friend",
];

/// Trainable message classifier.
///
/// `classify` is total and deterministic for a fixed trained/untrained
/// state. The fitted model lives behind an `Arc` snapshot: `train` fits a
/// complete replacement and swaps the reference, so a concurrent classify
/// observes either the old or the new model, never a partial one.
pub struct Classifier {
    model: RwLock<Option<Arc<TextModel<Category>>>>,
}

impl Classifier {
    /// Creates an untrained classifier (keyword fallback active).
    pub fn new() -> Self {
        Self {
            model: RwLock::new(None),
        }
    }

    /// Whether a trained model is active.
    pub fn is_trained(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Fits a new model from labeled examples and swaps it in atomically.
    ///
    /// Retraining is idempotent: the prior model state is replaced
    /// wholesale. An empty corpus installs an unfitted model, which
    /// reverts classification to the keyword fallback.
    pub fn train(&self, examples: &[TrainingExample<Category>]) {
        let pairs: Vec<(&str, Category)> = examples
            .iter()
            .map(|ex| (ex.text.as_str(), ex.label))
            .collect();
        let model = TextModel::fit(&pairs, &Category::TIE_BREAK_ORDER);
        let model = model.is_fitted().then(|| Arc::new(model));

        let mut slot = self
            .model
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = model;
        tracing::info!(examples = examples.len(), "classifier retrained");
    }

    /// Classifies text (subject and body concatenated) into a category.
    ///
    /// Empty or whitespace-only input is the lowest-confidence case and
    /// maps to [`Category::General`].
    pub fn classify(&self, text: &str) -> Category {
        if text.trim().is_empty() {
            return Category::General;
        }

        if let Some(model) = self.snapshot() {
            if let Some(category) = model.predict(text) {
                return category;
            }
        }

        Self::keyword_fallback(text)
    }

    /// Clones the current model snapshot, holding the read lock only for
    /// the duration of the clone.
    fn snapshot(&self) -> Option<Arc<TextModel<Category>>> {
        self.model
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn keyword_fallback(text: &str) -> Category {
        let lowered = text.to_lowercase();
        let tables: [(Category, &[&str]); 3] = [
            (Category::Spam, SPAM_KEYWORDS),
            (Category::Work, WORK_KEYWORDS),
            (Category::Personal, PERSONAL_KEYWORDS),
        ];
        for (category, keywords) in tables {
            if keywords.iter().any(|kw| lowered.contains(kw)) {
                return category;
            }
        }
        Category::General
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
