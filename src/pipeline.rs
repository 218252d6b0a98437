//! Triage pipeline orchestration.
//!
//! The [`TriagePipeline`] composes the transport and the triage components
//! and owns all session state: the in-memory message collection and the
//! active draft per message. Calls are issued sequentially per message;
//! no component retains references into the collection beyond one call.

use std::collections::HashMap;

use crate::config::Settings;
use crate::domain::{DraftReply, DraftState, Message, MessageId};
use crate::transport::{Credentials, MailTransport, Result, TransportError};
use crate::triage::{Classifier, Prioritizer, ReplyGenerator, TrainingCorpus};

/// Orchestrates fetch, triage, draft review, and send.
///
/// # Failure handling
///
/// Network calls run under the configured timeout and are retried at most
/// once (connection and protocol failures and timeouts, after a fixed
/// backoff).
/// Fetch failures leave the existing message collection untouched; send
/// failures leave the draft in [`DraftState::Failed`], permitting a
/// re-send without regenerating it.
pub struct TriagePipeline {
    transport: Box<dyn MailTransport>,
    classifier: Classifier,
    prioritizer: Prioritizer,
    reply_generator: ReplyGenerator,
    settings: Settings,
    messages: Vec<Message>,
    drafts: HashMap<MessageId, DraftReply>,
}

impl TriagePipeline {
    /// Creates a pipeline over the given transport with default settings.
    pub fn new(transport: Box<dyn MailTransport>) -> Self {
        Self::with_settings(transport, Settings::default())
    }

    /// Creates a pipeline with explicit settings.
    pub fn with_settings(transport: Box<dyn MailTransport>, settings: Settings) -> Self {
        Self {
            transport,
            classifier: Classifier::new(),
            prioritizer: Prioritizer::new(),
            reply_generator: ReplyGenerator::new(),
            settings,
            messages: Vec::new(),
            drafts: HashMap::new(),
        }
    }

    /// Connects the underlying transport.
    ///
    /// Credentials live only inside the transport's connection handle;
    /// authentication failures surface verbatim and are never retried.
    pub async fn connect(&mut self, credentials: Credentials) -> Result<()> {
        self.transport.connect(credentials).await
    }

    /// Disconnects the underlying transport.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.transport.disconnect().await
    }

    /// Fetches up to `limit` messages and annotates each with a category
    /// and priority.
    ///
    /// The session collection is replaced wholesale on success; on failure
    /// it is left untouched. Returns the annotated collection,
    /// most-recent-first.
    pub async fn fetch_and_annotate(&mut self, limit: usize) -> Result<&[Message]> {
        if limit == 0 {
            return Err(TransportError::InvalidRequest(
                "fetch limit must be positive".to_string(),
            ));
        }

        let mut fetched = match self.fetch_once(limit).await {
            Ok(messages) => messages,
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "fetch failed, retrying once");
                tokio::time::sleep(self.settings.network.retry_backoff()).await;
                self.fetch_once(limit).await?
            }
            Err(e) => return Err(e),
        };

        for message in &mut fetched {
            let category = self.classifier.classify(&message.full_text());
            message.category = Some(category);
            message.priority = Some(self.prioritizer.score(message));
        }

        tracing::info!(count = fetched.len(), "messages triaged");
        self.messages = fetched;
        Ok(&self.messages)
    }

    /// Fetches using the configured default limit.
    pub async fn fetch_and_annotate_default(&mut self) -> Result<&[Message]> {
        let limit = self.settings.fetch.default_limit;
        self.fetch_and_annotate(limit).await
    }

    async fn fetch_once(&self, limit: usize) -> Result<Vec<Message>> {
        let timeout = self.settings.network.timeout();
        match tokio::time::timeout(timeout, self.transport.fetch(limit)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Connection(format!(
                "fetch timed out after {:?}",
                timeout
            ))),
        }
    }

    /// Generates a draft reply for a message, replacing any prior draft
    /// for that id.
    ///
    /// If the message has not been classified yet, it is classified on the
    /// fly for template selection (the stored message is not modified).
    pub fn draft_reply(&mut self, message_id: &MessageId) -> Result<DraftReply> {
        let message = self.find_message(message_id)?;
        let category = message
            .category
            .unwrap_or_else(|| self.classifier.classify(&message.full_text()));
        let body = self.reply_generator.generate(&message.body, category);

        let draft = DraftReply::generated(message_id.clone(), body);
        self.drafts.insert(message_id.clone(), draft.clone());
        Ok(draft)
    }

    /// Applies a human edit to the active draft for a message.
    pub fn edit_draft(&mut self, message_id: &MessageId, body: impl Into<String>) -> Result<()> {
        let draft = self.drafts.get_mut(message_id).ok_or_else(|| {
            TransportError::InvalidRequest(format!("no draft for message {}", message_id))
        })?;
        draft.edit(body);
        Ok(())
    }

    /// Sends the active draft for a message, optionally applying a final
    /// edit first.
    ///
    /// Returns `Ok(true)` and marks the draft [`DraftState::Sent`] on
    /// success. A protocol-level soft failure returns `Ok(false)`; a
    /// transport failure (after one retry) returns the error. Either
    /// failure leaves the draft [`DraftState::Failed`] so it can be
    /// re-sent without regeneration.
    pub async fn send(
        &mut self,
        message_id: &MessageId,
        edited_body: Option<&str>,
    ) -> Result<bool> {
        let message = self.find_message(message_id)?.clone();

        if let Some(body) = edited_body {
            self.edit_draft(message_id, body)?;
        }
        let body = self
            .drafts
            .get(message_id)
            .ok_or_else(|| {
                TransportError::InvalidRequest(format!("no draft for message {}", message_id))
            })?
            .body
            .clone();

        let outcome = match self.send_once(&message, &body).await {
            Ok(sent) => Ok(sent),
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "send failed, retrying once");
                tokio::time::sleep(self.settings.network.retry_backoff()).await;
                self.send_once(&message, &body).await
            }
            Err(e) => Err(e),
        };

        if let Some(draft) = self.drafts.get_mut(message_id) {
            draft.state = match outcome {
                Ok(true) => DraftState::Sent,
                _ => DraftState::Failed,
            };
        }
        outcome
    }

    async fn send_once(&self, message: &Message, body: &str) -> Result<bool> {
        let timeout = self.settings.network.timeout();
        match tokio::time::timeout(timeout, self.transport.send_reply(message, body)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Connection(format!(
                "send timed out after {:?}",
                timeout
            ))),
        }
    }

    /// Retrains both models from the built-in corpus.
    pub fn retrain(&self) {
        self.retrain_with(&TrainingCorpus::builtin());
    }

    /// Retrains both models from a supplied corpus. Each model swap is
    /// atomic: a classify or score call observes either the pre- or
    /// post-training model, never a mixed state.
    pub fn retrain_with(&self, corpus: &TrainingCorpus) {
        self.classifier.train(&corpus.categories);
        self.prioritizer.train(&corpus.priorities);
    }

    /// Whether both models carry trained state.
    pub fn is_trained(&self) -> bool {
        self.classifier.is_trained() && self.prioritizer.is_trained()
    }

    /// The session message collection, most-recent-first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The active draft for a message, if one exists.
    pub fn draft(&self, message_id: &MessageId) -> Option<&DraftReply> {
        self.drafts.get(message_id)
    }

    /// Marks a message read or unread (the UI collaborator's mutation
    /// point). Returns whether the message was found.
    pub fn mark_read(&mut self, message_id: &MessageId, read: bool) -> bool {
        match self.messages.iter_mut().find(|m| &m.id == message_id) {
            Some(message) => {
                message.is_read = read;
                true
            }
            None => false,
        }
    }

    fn find_message(&self, message_id: &MessageId) -> Result<&Message> {
        self.messages
            .iter()
            .find(|m| &m.id == message_id)
            .ok_or_else(|| {
                TransportError::InvalidRequest(format!("unknown message {}", message_id))
            })
    }
}
