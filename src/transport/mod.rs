//! Mailbox transport abstraction.
//!
//! This module defines the [`MailTransport`] trait which abstracts over the
//! mailbox-facing fetch/send boundary. The network implementation lives in
//! [`imap_smtp`]; an in-memory [`fixture`] implementation backs demo mode
//! and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Message;

pub mod fixture;
pub mod imap_smtp;

pub use fixture::FixtureTransport;
pub use imap_smtp::{ImapSmtpConfig, ImapSmtpTransport};

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur at the mailbox transport boundary.
///
/// The triage components (classifier, prioritizer, reply generator) never
/// raise; they degrade to defined defaults. Only the transport surfaces
/// external-system failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Bad credentials. Fatal to connect; never retried automatically.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection failure during connect/fetch/send.
    /// Retried once with backoff by the pipeline, then surfaced.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server misbehaved at the protocol level. Retried once with
    /// backoff by the pipeline, then surfaced.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid request parameters (e.g. `limit == 0`, empty credential).
    /// Rejected before any network call is attempted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Whether the pipeline's single-retry policy applies to this error.
    ///
    /// Connection and protocol failures are retried; authentication and
    /// validation failures would fail identically on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Connection(_) | TransportError::Protocol(_)
        )
    }
}

/// Mailbox credentials supplied by the caller at connect time.
///
/// Held only for the lifetime of the live connection handle; never logged
/// or persisted. The `Debug` impl redacts the secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Mailbox address (usually the email address).
    pub address: String,
    /// App-level secret or password.
    pub secret: String,
}

impl Credentials {
    /// Creates credentials from a mailbox address and secret.
    pub fn new(address: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            secret: secret.into(),
        }
    }

    /// Rejects empty address or secret before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(TransportError::InvalidRequest(
                "mailbox address must not be empty".to_string(),
            ));
        }
        if self.secret.is_empty() {
            return Err(TransportError::InvalidRequest(
                "credential secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Trait for mailbox transport implementations.
///
/// Abstracts over the fetch/send boundary so the pipeline can run against
/// a real IMAP/SMTP backend or an in-memory fixture. Network sessions are
/// scoped resources: acquired on [`connect`](Self::connect), released on
/// [`disconnect`](Self::disconnect) or teardown.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Opens both mailbox sessions (fetch-capable and send-capable).
    ///
    /// Both must be established or the whole operation fails; no partial
    /// connection is ever exposed. Connecting an already-connected
    /// transport is rejected; disconnect first.
    ///
    /// # Errors
    ///
    /// [`TransportError::Authentication`] for bad credentials,
    /// [`TransportError::Connection`] for network failures,
    /// [`TransportError::InvalidRequest`] for empty credentials (rejected
    /// before any network I/O).
    async fn connect(&mut self, credentials: Credentials) -> Result<()>;

    /// Fetches up to `limit` messages, most-recent-first.
    ///
    /// Returned messages are unclassified and unprioritized. If fewer than
    /// `limit` exist, all available are returned. On failure nothing is
    /// returned — never a truncated partial batch.
    ///
    /// # Errors
    ///
    /// [`TransportError::InvalidRequest`] if `limit == 0`, rejected before
    /// any network call.
    async fn fetch(&self, limit: usize) -> Result<Vec<Message>>;

    /// Sends a reply to the sender of `original`, preserving threading.
    ///
    /// The outgoing message is addressed to `original.sender`, carries a
    /// `Re:`-prefixed subject, and references the original where the
    /// protocol supports it.
    ///
    /// Returns `Ok(false)` for protocol-level soft failures (e.g. the
    /// recipient was rejected); returns an error only for connection-level
    /// failures, so callers can distinguish "message not deliverable" from
    /// "cannot talk to server".
    async fn send_reply(&self, original: &Message, reply_body: &str) -> Result<bool>;

    /// Releases both sessions.
    async fn disconnect(&mut self) -> Result<()>;
}

/// Applies the reply-subject convention: prefix with `Re: ` unless the
/// subject already carries it (case-insensitive).
pub(crate) fn reply_subject(subject: &str) -> String {
    let trimmed = subject.trim();
    if trimmed.to_lowercase().starts_with("re:") {
        trimmed.to_string()
    } else {
        format!("Re: {}", trimmed)
    }
}
