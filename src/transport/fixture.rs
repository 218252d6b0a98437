//! In-memory mailbox transport.
//!
//! Backs demo mode ("load sample emails") and the test suite: a
//! [`FixtureTransport`] behaves like a real mailbox without a network,
//! and can be scripted to reject recipients or fail outright so every
//! failure path of the pipeline is reachable from tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::{Credentials, MailTransport, Result, TransportError};
use crate::domain::{Address, Message, MessageId};

/// A reply accepted by the fixture, recorded for inspection.
#[derive(Debug, Clone)]
pub struct SentReply {
    /// Recipient address.
    pub to: String,
    /// Subject line of the outgoing message.
    pub subject: String,
    /// Reply body as sent.
    pub body: String,
}

#[derive(Default)]
struct FixtureState {
    connected: bool,
    mailbox: Vec<Message>,
    outbox: Vec<SentReply>,
    rejected_domains: HashSet<String>,
    fetch_failures: VecDeque<TransportError>,
    send_failures: VecDeque<TransportError>,
    reject_credentials: bool,
}

/// In-memory [`MailTransport`] implementation.
pub struct FixtureTransport {
    state: Mutex<FixtureState>,
}

impl FixtureTransport {
    /// Creates an empty fixture mailbox.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FixtureState::default()),
        }
    }

    /// Creates a fixture seeded with the built-in sample messages.
    pub fn with_sample_messages() -> Self {
        let fixture = Self::new();
        for message in sample_messages() {
            fixture.push_message(message);
        }
        fixture
    }

    /// Adds a message to the fixture mailbox.
    pub fn push_message(&self, message: Message) {
        self.lock().mailbox.push(message);
    }

    /// Marks a recipient domain as rejecting delivery: sends to it succeed
    /// at the protocol level but report `false`.
    pub fn reject_domain(&self, domain: impl Into<String>) {
        self.lock().rejected_domains.insert(domain.into().to_lowercase());
    }

    /// Queues an error for the next fetch call. Queued errors are consumed
    /// in order, one per call.
    pub fn fail_next_fetch(&self, error: TransportError) {
        self.lock().fetch_failures.push_back(error);
    }

    /// Queues an error for the next send call. Queued errors are consumed
    /// in order, one per call.
    pub fn fail_next_send(&self, error: TransportError) {
        self.lock().send_failures.push_back(error);
    }

    /// Makes connect fail with an authentication error.
    pub fn reject_credentials(&self) {
        self.lock().reject_credentials = true;
    }

    /// Returns the replies accepted so far.
    pub fn sent(&self) -> Vec<SentReply> {
        self.lock().outbox.clone()
    }

    /// Returns whether the fixture is connected.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open_session(&self, credentials: Credentials) -> Result<()> {
        credentials.validate()?;
        let mut state = self.lock();
        if state.connected {
            return Err(TransportError::InvalidRequest(
                "already connected; disconnect first".to_string(),
            ));
        }
        if state.reject_credentials {
            return Err(TransportError::Authentication(
                "invalid mailbox credentials".to_string(),
            ));
        }
        state.connected = true;
        Ok(())
    }

    fn fetch_messages(&self, limit: usize) -> Result<Vec<Message>> {
        if limit == 0 {
            return Err(TransportError::InvalidRequest(
                "fetch limit must be positive".to_string(),
            ));
        }

        let mut state = self.lock();
        if !state.connected {
            return Err(TransportError::Connection("not connected".to_string()));
        }
        if let Some(error) = state.fetch_failures.pop_front() {
            return Err(error);
        }

        let mut messages = state.mailbox.clone();
        messages.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        messages.truncate(limit);
        Ok(messages)
    }

    fn deliver(&self, original: &Message, reply_body: &str) -> Result<bool> {
        let mut state = self.lock();
        if !state.connected {
            return Err(TransportError::Connection("not connected".to_string()));
        }
        if let Some(error) = state.send_failures.pop_front() {
            return Err(error);
        }
        if state.rejected_domains.contains(&original.sender.domain()) {
            return Ok(false);
        }

        state.outbox.push(SentReply {
            to: original.sender.email.clone(),
            subject: super::reply_subject(&original.subject),
            body: reply_body.to_string(),
        });
        Ok(true)
    }

    fn close_session(&self) {
        self.lock().connected = false;
    }
}

impl Default for FixtureTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for FixtureTransport {
    async fn connect(&mut self, credentials: Credentials) -> Result<()> {
        self.open_session(credentials)
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<Message>> {
        self.fetch_messages(limit)
    }

    async fn send_reply(&self, original: &Message, reply_body: &str) -> Result<bool> {
        self.deliver(original, reply_body)
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.close_session();
        Ok(())
    }
}

/// Shared-handle form: the pipeline owns the boxed transport while the
/// caller keeps a clone of the `Arc` to script failures and inspect the
/// outbox.
#[async_trait]
impl MailTransport for std::sync::Arc<FixtureTransport> {
    async fn connect(&mut self, credentials: Credentials) -> Result<()> {
        self.open_session(credentials)
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<Message>> {
        self.fetch_messages(limit)
    }

    async fn send_reply(&self, original: &Message, reply_body: &str) -> Result<bool> {
        self.deliver(original, reply_body)
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.close_session();
        Ok(())
    }
}

/// The built-in sample mailbox, returned most-recent-first by fetch.
pub fn sample_messages() -> Vec<Message> {
    let now = Utc::now();
    vec![
        Message {
            id: MessageId::from("sample-1"),
            subject: "Project Deadline Tomorrow".to_string(),
            sender: Address::new("boss@company.com"),
            body: "Please send an update. The final report is due by Friday.".to_string(),
            received_at: now,
            category: None,
            priority: None,
            is_read: false,
        },
        Message {
            id: MessageId::from("sample-2"),
            subject: "Coffee This Weekend?".to_string(),
            sender: Address::new("friend@email.com"),
            body: "Hey! Are you free this Sunday for coffee at our usual spot?".to_string(),
            received_at: now - Duration::hours(2),
            category: None,
            priority: None,
            is_read: false,
        },
    ]
}
