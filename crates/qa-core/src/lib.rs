//! Q&A Core Library
//!
//! Error taxonomy and storage ports shared by every backend.

// Re-export entity types from qa-types
pub use qa_types::*;

pub mod error;
pub mod ports;

pub use error::{Entity, QaError, Result};
pub use ports::{AnswerRepo, QuestionRepo};
