//! Domain layer types for the triage pipeline.
//!
//! This module contains the core domain types used throughout the crate:
//! messages, the closed category/priority label sets, and draft replies.

mod draft;
mod message;
mod types;

pub use draft::{DraftReply, DraftState};
pub use message::{Address, Category, Message, Priority};
pub use types::{DraftId, MessageId};
