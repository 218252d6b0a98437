//! Training examples and the built-in labeled corpus.
//!
//! Examples are consumed during training only; nothing of them survives
//! beyond the fitted model snapshots.

use crate::domain::{Category, Priority};

/// One labeled training example.
#[derive(Debug, Clone)]
pub struct TrainingExample<L> {
    /// Feature text.
    pub text: String,
    /// The label this text exemplifies.
    pub label: L,
}

impl<L> TrainingExample<L> {
    /// Creates a labeled example.
    pub fn new(text: impl Into<String>, label: L) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// A labeled corpus for retraining both triage models.
#[derive(Debug, Clone, Default)]
pub struct TrainingCorpus {
    /// Examples for the category classifier.
    pub categories: Vec<TrainingExample<Category>>,
    /// Examples for the prioritizer.
    pub priorities: Vec<TrainingExample<Priority>>,
}

impl TrainingCorpus {
    /// The corpus that ships with the crate, used when retraining without
    /// a caller-supplied corpus.
    pub fn builtin() -> Self {
        let categories = vec![
            TrainingExample::new(
                "Project deadline tomorrow, please send the final report and a status update",
                Category::Work,
            ),
            TrainingExample::new(
                "Meeting scheduled with the client to review the quarterly invoice",
                Category::Work,
            ),
            TrainingExample::new(
                "Can you review the project proposal before the planning meeting",
                Category::Work,
            ),
            TrainingExample::new(
                "The report is due Friday, share your progress with the manager",
                Category::Work,
            ),
            TrainingExample::new(
                "Reminder: performance review meeting with HR next week",
                Category::Work,
            ),
            TrainingExample::new(
                "Are you free this Sunday for coffee at our usual spot",
                Category::Personal,
            ),
            TrainingExample::new(
                "Dinner at our place Saturday? The family would love to see you",
                Category::Personal,
            ),
            TrainingExample::new(
                "Movie night this weekend, let me know which film you want",
                Category::Personal,
            ),
            TrainingExample::new(
                "Happy birthday! Hope the party with your friends was fun",
                Category::Personal,
            ),
            TrainingExample::new(
                "It was great to hear from you, let's catch up over the weekend",
                Category::Personal,
            ),
            TrainingExample::new(
                "Congratulations! You are a winner, claim your free prize now",
                Category::Spam,
            ),
            TrainingExample::new(
                "You have won the lottery, click here to collect your winnings",
                Category::Spam,
            ),
            TrainingExample::new(
                "Limited offer: free crypto bonus, act now before it expires",
                Category::Spam,
            ),
            TrainingExample::new(
                "Unsubscribe now or keep receiving exclusive discount offers",
                Category::Spam,
            ),
            TrainingExample::new(
                "Your package tracking number and delivery confirmation",
                Category::General,
            ),
            TrainingExample::new(
                "Monthly newsletter: what changed on the platform this month",
                Category::General,
            ),
            TrainingExample::new(
                "Your receipt and order confirmation for a recent purchase",
                Category::General,
            ),
        ];

        let priorities = vec![
            TrainingExample::new(
                "deadline tomorrow urgent please respond asap category:work sender:company.com",
                Priority::High,
            ),
            TrainingExample::new(
                "the report is due by friday send an update immediately category:work",
                Priority::High,
            ),
            TrainingExample::new(
                "critical outage needs attention now category:work sender:company.com",
                Priority::High,
            ),
            TrainingExample::new(
                "overdue invoice must be paid by eod category:work",
                Priority::High,
            ),
            TrainingExample::new(
                "meeting notes from the weekly review category:work sender:company.com",
                Priority::Medium,
            ),
            TrainingExample::new(
                "schedule a planning session sometime next sprint category:work",
                Priority::Medium,
            ),
            TrainingExample::new(
                "question about the project proposal when you have time category:work",
                Priority::Medium,
            ),
            TrainingExample::new(
                "coffee this sunday at our usual spot category:personal sender:email.com",
                Priority::Low,
            ),
            TrainingExample::new(
                "movie night whenever you are free category:personal",
                Priority::Low,
            ),
            TrainingExample::new(
                "monthly newsletter nothing actionable category:general",
                Priority::Low,
            ),
            TrainingExample::new(
                "order confirmation for your records category:general",
                Priority::Low,
            ),
        ];

        Self {
            categories,
            priorities,
        }
    }
}
