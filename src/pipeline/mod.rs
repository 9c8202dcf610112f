//! Document pipeline: normalization, prompting, summary parsing, and chat sessions.

pub mod conversation;
pub mod normalize;
pub mod prompt;
mod service;
mod session;
pub mod summary;
pub mod types;

pub use service::{PipelineApi, PipelineService};
pub use types::{
    Document, DocumentSummary, PipelineError, SessionCreated, SessionView,
};
