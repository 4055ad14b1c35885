//! Storage traits for persistence
//!
//! Every read and delete fails with [`QaError::NotFound`] when the identity
//! does not resolve to a live record. Unclassified backend failures surface as
//! [`QaError::StorageFailure`].
//!
//! [`QaError::NotFound`]: crate::QaError::NotFound
//! [`QaError::StorageFailure`]: crate::QaError::StorageFailure

use crate::Result;
use async_trait::async_trait;
use qa_types::{Answer, AnswerId, NewAnswer, NewQuestion, Question, QuestionId};

/// Question store
#[async_trait]
pub trait QuestionRepo: Send + Sync {
    /// All questions, without their answers.
    async fn list_questions(&self) -> Result<Vec<Question>>;

    /// Assigns identity and, when absent, the creation timestamp.
    async fn create_question(&self, question: NewQuestion) -> Result<Question>;

    /// One question with its current answers joined.
    async fn get_question(&self, id: QuestionId) -> Result<Question>;

    async fn delete_question(&self, id: QuestionId) -> Result<()>;
}

/// Answer store
#[async_trait]
pub trait AnswerRepo: Send + Sync {
    /// Fails with `NotFound(Question)` when the parent question is absent.
    async fn create_answer(&self, answer: NewAnswer) -> Result<Answer>;

    async fn get_answer(&self, id: AnswerId) -> Result<Answer>;

    async fn delete_answer(&self, id: AnswerId) -> Result<()>;

    /// Remove every answer pointing at `question_id`, returning how many went.
    /// Zero is not an error.
    async fn delete_answers_for_question(&self, question_id: QuestionId) -> Result<u64>;
}
