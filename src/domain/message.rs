//! Message domain types.
//!
//! Represents one email held in memory for the session, together with the
//! closed category and priority label sets attached during triage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageId;

/// One email message.
///
/// Created unclassified by the transport (or a fixture loader); the
/// classifier and prioritizer attach `category` and `priority` in place.
/// Messages are never deleted within a session, only replaced wholesale on
/// re-fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier, stable for the session.
    pub id: MessageId,
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub sender: Address,
    /// Plain text body content.
    pub body: String,
    /// Date and time the message was received.
    pub received_at: DateTime<Utc>,
    /// Topical category; absent until classified.
    pub category: Option<Category>,
    /// Urgency level; absent until prioritized.
    pub priority: Option<Priority>,
    /// Whether the message has been read. Mutated by the UI collaborator only.
    pub is_read: bool,
}

impl Message {
    /// Returns the subject and body concatenated, the text the classifier sees.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }
}

/// An email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Email address.
    pub email: String,
    /// Display name (e.g., "John Doe").
    pub name: Option<String>,
}

impl Address {
    /// Creates a new address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates a new address with email and display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// Returns the display representation of this address.
    ///
    /// If a name is present, returns "Name <email>", otherwise just the email.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }

    /// Returns the part before the `@`, lowercased.
    pub fn local_part(&self) -> String {
        self.email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Returns the part after the `@`, lowercased.
    pub fn domain(&self) -> String {
        self.email
            .split_once('@')
            .map(|(_, d)| d.to_lowercase())
            .unwrap_or_default()
    }
}

/// Topical category of a message. A closed label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Job or business related.
    Work,
    /// Friends and family.
    Personal,
    /// Unsolicited or junk mail.
    Spam,
    /// Anything else; the lowest-confidence default.
    General,
}

impl Category {
    /// All categories in tie-break order: when two categories score equally,
    /// the one listed first wins. This makes classification deterministic
    /// for identical input.
    pub const TIE_BREAK_ORDER: [Category; 4] = [
        Category::Spam,
        Category::Work,
        Category::Personal,
        Category::General,
    ];

    /// Stable lowercase label, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Spam => "spam",
            Category::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency level of a message. A closed, ordered label set.
///
/// The derived `Ord` follows declaration order: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Should be handled soon.
    Medium,
    /// Needs attention now.
    High,
}

impl Priority {
    /// Stable lowercase label, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
