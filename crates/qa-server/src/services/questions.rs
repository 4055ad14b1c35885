//! Question use-cases

use qa_core::{AnswerRepo, NewQuestion, Question, QuestionId, QuestionRepo, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct QuestionService {
    questions: Arc<dyn QuestionRepo>,
    answers: Arc<dyn AnswerRepo>,
}

impl QuestionService {
    pub fn new(questions: Arc<dyn QuestionRepo>, answers: Arc<dyn AnswerRepo>) -> Self {
        Self { questions, answers }
    }

    pub async fn list_questions(&self) -> Result<Vec<Question>> {
        info!("Getting question list");
        self.questions.list_questions().await.map_err(|e| {
            error!(error = %e, "Failed to get question list");
            e
        })
    }

    pub async fn create_question(&self, question: NewQuestion) -> Result<Question> {
        info!(text = %question.text, "Creating question");

        let question = self.questions.create_question(question).await.map_err(|e| {
            error!(error = %e, "Failed to create question");
            e
        })?;

        info!(id = question.id, "Question created successfully");
        Ok(question)
    }

    pub async fn get_question(&self, id: QuestionId) -> Result<Question> {
        info!(id, "Getting question");
        self.questions.get_question(id).await.map_err(|e| {
            error!(id, error = %e, "Failed to get question");
            e
        })
    }

    /// Delete the question, then its answers.
    ///
    /// The relational schema has already cascaded by the time the purge runs;
    /// the memory backend relies on it. The question delete is committed
    /// before the purge, so a failed purge leaves orphans but not an error.
    pub async fn delete_question(&self, id: QuestionId) -> Result<()> {
        info!(id, "Deleting question");

        self.questions.delete_question(id).await.map_err(|e| {
            error!(id, error = %e, "Failed to delete question");
            e
        })?;

        match self.answers.delete_answers_for_question(id).await {
            Ok(purged) => debug!(id, purged, "Purged answers of deleted question"),
            Err(e) => warn!(id, error = %e, "Failed to purge answers of deleted question"),
        }

        info!(id, "Question deleted successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, MemoryAnswerRepo, MemoryQuestionRepo, MemoryStore};
    use async_trait::async_trait;
    use qa_core::{Answer, AnswerId, Entity, NewAnswer, QaError};

    fn memory_service() -> (QuestionService, Arc<dyn AnswerRepo>) {
        let store = Arc::new(MemoryStore::new());
        let answers: Arc<dyn AnswerRepo> = Arc::new(MemoryAnswerRepo::new(store.clone()));
        let service = QuestionService::new(Arc::new(MemoryQuestionRepo::new(store)), answers.clone());
        (service, answers)
    }

    async fn sqlite_service() -> (QuestionService, Arc<dyn AnswerRepo>) {
        let db = Database::connect_in_memory().await.unwrap();
        let answers: Arc<dyn AnswerRepo> = Arc::new(db.answer_repo());
        let service = QuestionService::new(Arc::new(db.question_repo()), answers.clone());
        (service, answers)
    }

    async fn assert_delete_removes_answers(service: QuestionService, answers: Arc<dyn AnswerRepo>) {
        let question = service
            .create_question(NewQuestion::new("Q1"))
            .await
            .unwrap();
        let answer = answers
            .create_answer(NewAnswer::new(question.id, "u1", "A1"))
            .await
            .unwrap();

        service.delete_question(question.id).await.unwrap();

        let err = answers.get_answer(answer.id).await.unwrap_err();
        assert!(matches!(err, QaError::NotFound(Entity::Answer)));

        let err = service.delete_question(question.id).await.unwrap_err();
        assert!(matches!(err, QaError::NotFound(Entity::Question)));
    }

    #[tokio::test]
    async fn test_delete_cascades_in_memory() {
        let (service, answers) = memory_service();
        assert_delete_removes_answers(service, answers).await;
    }

    #[tokio::test]
    async fn test_delete_cascades_in_sqlite() {
        let (service, answers) = sqlite_service().await;
        assert_delete_removes_answers(service, answers).await;
    }

    #[tokio::test]
    async fn test_missing_question_keeps_answers() {
        let (service, answers) = memory_service();

        let question = service
            .create_question(NewQuestion::new("Q1"))
            .await
            .unwrap();
        answers
            .create_answer(NewAnswer::new(question.id, "u1", "A1"))
            .await
            .unwrap();

        assert!(service.delete_question(question.id + 1).await.is_err());
        let fetched = service.get_question(question.id).await.unwrap();
        assert_eq!(fetched.answers.len(), 1);
    }

    /// Answer store that is always locked
    struct LockedAnswerRepo;

    #[async_trait]
    impl AnswerRepo for LockedAnswerRepo {
        async fn create_answer(&self, _answer: NewAnswer) -> Result<Answer> {
            Err(QaError::storage("database is locked"))
        }

        async fn get_answer(&self, _id: AnswerId) -> Result<Answer> {
            Err(QaError::storage("database is locked"))
        }

        async fn delete_answer(&self, _id: AnswerId) -> Result<()> {
            Err(QaError::storage("database is locked"))
        }

        async fn delete_answers_for_question(&self, _question_id: QuestionId) -> Result<u64> {
            Err(QaError::storage("database is locked"))
        }
    }

    #[tokio::test]
    async fn test_failed_purge_still_reports_delete() {
        let store = Arc::new(MemoryStore::new());
        let service = QuestionService::new(
            Arc::new(MemoryQuestionRepo::new(store)),
            Arc::new(LockedAnswerRepo),
        );

        let question = service
            .create_question(NewQuestion::new("Q1"))
            .await
            .unwrap();

        service.delete_question(question.id).await.unwrap();

        let err = service.get_question(question.id).await.unwrap_err();
        assert!(matches!(err, QaError::NotFound(Entity::Question)));
    }
}
