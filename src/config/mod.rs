//! Configuration and settings management.
//!
//! Settings types for the triage pipeline. All state is transient; callers
//! construct (or deserialize) a [`Settings`] value and hand it to the
//! pipeline at startup.

mod settings;

pub use settings::{FetchSettings, NetworkSettings, Settings};
