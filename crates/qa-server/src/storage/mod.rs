//! Storage layer
//!
//! Uses SQLite (embedded) for the relational backend.
//! Uses locked in-process maps for the memory backend.

pub mod db;
pub mod memory;

pub use db::Database;
pub use memory::{MemoryAnswerRepo, MemoryQuestionRepo, MemoryStore};
