//! Use-case services: logging around each repository call

pub mod answers;
pub mod questions;

pub use answers::AnswerService;
pub use questions::QuestionService;
