//! Message prioritizer.
//!
//! Maps a classified message to a [`Priority`] from urgency keywords,
//! sender role/domain signals, and the message category. Spam is always
//! low priority, trained or not. Retraining swaps an immutable model
//! snapshot atomically, mirroring the classifier.

use std::sync::{Arc, RwLock};

use super::corpus::TrainingExample;
use super::model::TextModel;
use crate::domain::{Category, Message, Priority};

const URGENCY_KEYWORDS: &[&str] = &[
    "deadline",
    "asap",
    "urgent",
    "due",
    "immediately",
    "eod",
    "critical",
    "overdue",
];

/// Role words in the sender's local part that signal an important sender.
/// Matched against whole delimiter-separated tokens ("hr.team" signals,
/// "chris" does not).
const ROLE_SIGNALS: &[&str] = &[
    "boss", "manager", "ceo", "director", "admin", "hr", "lead", "chief",
];

/// Priority labels in tie-break order for the trained model: when scores
/// tie, the higher urgency wins.
const PRIORITY_ORDER: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

/// Trainable message prioritizer.
pub struct Prioritizer {
    model: RwLock<Option<Arc<TextModel<Priority>>>>,
}

impl Prioritizer {
    /// Creates an untrained prioritizer (rule fallback active).
    pub fn new() -> Self {
        Self {
            model: RwLock::new(None),
        }
    }

    /// Whether a trained model is active.
    pub fn is_trained(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Fits a new model and swaps it in atomically. An empty corpus
    /// installs no model and reverts scoring to the rule fallback.
    pub fn train(&self, examples: &[TrainingExample<Priority>]) {
        let pairs: Vec<(&str, Priority)> = examples
            .iter()
            .map(|ex| (ex.text.as_str(), ex.label))
            .collect();
        let model = TextModel::fit(&pairs, &PRIORITY_ORDER);
        let model = model.is_fitted().then(|| Arc::new(model));

        let mut slot = self
            .model
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = model;
        tracing::info!(examples = examples.len(), "prioritizer retrained");
    }

    /// Scores a message. Total and deterministic for a fixed
    /// trained/untrained state.
    ///
    /// Spam always maps to [`Priority::Low`], before any model or rule is
    /// consulted.
    pub fn score(&self, message: &Message) -> Priority {
        if message.category == Some(Category::Spam) {
            return Priority::Low;
        }

        if let Some(model) = self.snapshot() {
            if let Some(priority) = model.predict(&Self::feature_text(message)) {
                return priority;
            }
        }

        Self::rule_fallback(message)
    }

    fn snapshot(&self) -> Option<Arc<TextModel<Priority>>> {
        self.model
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Feature text for the trained model: message text plus sender-domain
    /// and category tokens, so those signals survive into the model.
    fn feature_text(message: &Message) -> String {
        let category = message
            .category
            .map(|c| c.as_str())
            .unwrap_or("unlabeled");
        format!(
            "{} sender:{} category:{}",
            message.full_text(),
            message.sender.domain(),
            category
        )
    }

    /// Untrained policy: urgency keywords dominate, then sender role or a
    /// work category, else low.
    fn rule_fallback(message: &Message) -> Priority {
        let text = message.full_text().to_lowercase();
        if URGENCY_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            return Priority::High;
        }

        let local_part = message.sender.local_part();
        let role_sender = local_part
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| ROLE_SIGNALS.contains(&token));
        if role_sender || message.category == Some(Category::Work) {
            return Priority::Medium;
        }

        Priority::Low
    }
}

impl Default for Prioritizer {
    fn default() -> Self {
        Self::new()
    }
}
