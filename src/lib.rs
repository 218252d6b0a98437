//! mailtriage - an email triage and reply pipeline
//!
//! Fetches recent messages over IMAP, classifies and prioritizes them with
//! a retrainable text model (keyword rules as the untrained fallback),
//! drafts templated replies for human review, and sends approved replies
//! over SMTP. The [`TriagePipeline`] ties the pieces together and owns all
//! session state.

pub mod config;
pub mod domain;
pub mod pipeline;
pub mod transport;
pub mod triage;

pub use pipeline::TriagePipeline;
