//! Triage components: classification, prioritization, reply synthesis.
//!
//! All three are total functions over their inputs — they never fail for
//! malformed or empty text, degrading to defined defaults instead. The two
//! trainable components keep their fitted state as immutable snapshots
//! swapped atomically on retrain.

mod classifier;
mod corpus;
mod model;
mod prioritizer;
mod reply;

pub use classifier::Classifier;
pub use corpus::{TrainingCorpus, TrainingExample};
pub use prioritizer::Prioritizer;
pub use reply::ReplyGenerator;
