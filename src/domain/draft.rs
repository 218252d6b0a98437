//! Draft reply domain types.
//!
//! A [`DraftReply`] is a generated-but-unsent response awaiting human
//! review. At most one active draft exists per message id; regenerating
//! replaces any prior draft for that id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DraftId, MessageId};

/// A generated reply awaiting human review prior to transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftReply {
    /// Unique identifier for this draft.
    pub id: DraftId,
    /// The message this draft answers.
    pub message_id: MessageId,
    /// Reply text, editable by a human before send.
    pub body: String,
    /// Current lifecycle state.
    pub state: DraftState,
    /// When this draft was generated.
    pub created_at: DateTime<Utc>,
}

impl DraftReply {
    /// Creates a freshly generated draft for the given message.
    pub fn generated(message_id: MessageId, body: impl Into<String>) -> Self {
        Self {
            id: DraftId::new(),
            message_id,
            body: body.into(),
            state: DraftState::Generated,
            created_at: Utc::now(),
        }
    }

    /// Applies a human edit, replacing the body and marking the draft edited.
    pub fn edit(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.state = DraftState::Edited;
    }
}

/// Lifecycle state of a draft reply.
///
/// Transitions: `Generated` -> `Edited` (optional, on human modification)
/// -> `Sent` (on successful transport) or `Failed` (on soft failure or
/// transport error; re-sending is permitted without regenerating).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftState {
    /// Produced by the reply generator, untouched by a human.
    Generated,
    /// Modified by a human before send.
    Edited,
    /// Accepted by the transport.
    Sent,
    /// Rejected or undeliverable; may be re-sent.
    Failed,
}
