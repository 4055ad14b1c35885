//! Answer use-cases

use qa_core::{Answer, AnswerId, AnswerRepo, NewAnswer, Result};
use std::sync::Arc;
use tracing::{error, info};

pub struct AnswerService {
    answers: Arc<dyn AnswerRepo>,
}

impl AnswerService {
    pub fn new(answers: Arc<dyn AnswerRepo>) -> Self {
        Self { answers }
    }

    pub async fn create_answer(&self, answer: NewAnswer) -> Result<Answer> {
        info!(
            question_id = answer.question_id,
            user_id = %answer.user_id,
            "Creating answer"
        );

        let answer = self.answers.create_answer(answer).await.map_err(|e| {
            error!(error = %e, "Failed to create answer");
            e
        })?;

        info!(id = answer.id, "Answer created successfully");
        Ok(answer)
    }

    pub async fn get_answer(&self, id: AnswerId) -> Result<Answer> {
        info!(id, "Getting answer");
        self.answers.get_answer(id).await.map_err(|e| {
            error!(id, error = %e, "Failed to get answer");
            e
        })
    }

    pub async fn delete_answer(&self, id: AnswerId) -> Result<()> {
        info!(id, "Deleting answer");

        self.answers.delete_answer(id).await.map_err(|e| {
            error!(id, error = %e, "Failed to delete answer");
            e
        })?;

        info!(id, "Answer deleted successfully");
        Ok(())
    }
}
