//! In-memory storage (used by tests and `storage = "memory"`)
//!
//! A single [`MemoryStore`] owns both tables. The two repositories are cheap
//! handles onto the same store, so answer creation can check its parent and
//! question fetch can join answers without the repositories referencing each
//! other.
//!
//! Each table sits behind its own reader/writer lock. A cross-table operation
//! only ever takes the other table's *read* lock, and never while that other
//! table could be waiting on this one, so the two locks cannot deadlock.

use async_trait::async_trait;
use chrono::Utc;
use qa_core::{
    Answer, AnswerId, AnswerRepo, Entity, NewAnswer, NewQuestion, QaError, Question, QuestionId,
    QuestionRepo, Result,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Rows keyed by identity plus the next identity to hand out
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Only called under the table's write lock. Identities are never reused.
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[cfg(test)]
    fn seed(&mut self, id: i64, row: T) {
        self.rows.insert(id, row);
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }
}

/// Shared store-set owning the question and answer tables
pub struct MemoryStore {
    questions: RwLock<Table<Question>>,
    answers: RwLock<Table<Answer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            questions: RwLock::new(Table::new()),
            answers: RwLock::new(Table::new()),
        }
    }

    /// Insert a question with a pre-assigned identity.
    ///
    /// Later creations continue after the highest seeded id.
    #[cfg(test)]
    pub async fn seed_question(&self, mut question: Question) {
        question.answers.clear();
        self.questions.write().await.seed(question.id, question);
    }

    /// Insert an answer with a pre-assigned identity. The parent is not checked.
    #[cfg(test)]
    pub async fn seed_answer(&self, answer: Answer) {
        self.answers.write().await.seed(answer.id, answer);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemoryQuestionRepo {
    store: Arc<MemoryStore>,
}

impl MemoryQuestionRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QuestionRepo for MemoryQuestionRepo {
    async fn list_questions(&self) -> Result<Vec<Question>> {
        let questions = self.store.questions.read().await;
        Ok(questions.rows.values().cloned().collect())
    }

    async fn create_question(&self, question: NewQuestion) -> Result<Question> {
        let mut questions = self.store.questions.write().await;
        let id = questions.allocate_id();
        let question = question.into_question(id, Utc::now());
        questions.rows.insert(id, question.clone());
        Ok(question)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Question> {
        // Release the question lock before touching the answer table
        let mut question = {
            let questions = self.store.questions.read().await;
            questions
                .rows
                .get(&id)
                .cloned()
                .ok_or(QaError::NotFound(Entity::Question))?
        };

        let answers = self.store.answers.read().await;
        question.answers = answers
            .rows
            .values()
            .filter(|answer| answer.question_id == id)
            .cloned()
            .collect();

        Ok(question)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<()> {
        let mut questions = self.store.questions.write().await;
        questions
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(QaError::NotFound(Entity::Question))
    }
}

pub struct MemoryAnswerRepo {
    store: Arc<MemoryStore>,
}

impl MemoryAnswerRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AnswerRepo for MemoryAnswerRepo {
    async fn create_answer(&self, answer: NewAnswer) -> Result<Answer> {
        let mut answers = self.store.answers.write().await;

        let parent_exists = self
            .store
            .questions
            .read()
            .await
            .rows
            .contains_key(&answer.question_id);
        if !parent_exists {
            return Err(QaError::NotFound(Entity::Question));
        }

        let id = answers.allocate_id();
        let answer = answer.into_answer(id, Utc::now());
        answers.rows.insert(id, answer.clone());
        Ok(answer)
    }

    async fn get_answer(&self, id: AnswerId) -> Result<Answer> {
        let answers = self.store.answers.read().await;
        answers
            .rows
            .get(&id)
            .cloned()
            .ok_or(QaError::NotFound(Entity::Answer))
    }

    async fn delete_answer(&self, id: AnswerId) -> Result<()> {
        let mut answers = self.store.answers.write().await;
        answers
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(QaError::NotFound(Entity::Answer))
    }

    async fn delete_answers_for_question(&self, question_id: QuestionId) -> Result<u64> {
        let mut answers = self.store.answers.write().await;
        let before = answers.rows.len();
        answers
            .rows
            .retain(|_, answer| answer.question_id != question_id);
        Ok((before - answers.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn repos() -> (Arc<MemoryStore>, MemoryQuestionRepo, MemoryAnswerRepo) {
        let store = Arc::new(MemoryStore::new());
        let questions = MemoryQuestionRepo::new(store.clone());
        let answers = MemoryAnswerRepo::new(store.clone());
        (store, questions, answers)
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_and_never_reused() {
        let (_, questions, _) = repos();

        let first = questions.create_question(NewQuestion::new("Q1")).await.unwrap();
        let second = questions.create_question(NewQuestion::new("Q2")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        questions.delete_question(second.id).await.unwrap();
        let third = questions.create_question(NewQuestion::new("Q3")).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_get_joins_answers_but_list_does_not() {
        let (_, questions, answers) = repos();

        let question = questions.create_question(NewQuestion::new("Q1")).await.unwrap();
        answers
            .create_answer(NewAnswer::new(question.id, "u1", "A1"))
            .await
            .unwrap();
        answers
            .create_answer(NewAnswer::new(question.id, "u2", "A2"))
            .await
            .unwrap();

        let fetched = questions.get_question(question.id).await.unwrap();
        assert_eq!(fetched.text, "Q1");
        assert_eq!(fetched.answers.len(), 2);

        let listed = questions.list_questions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].answers.is_empty());
    }

    #[tokio::test]
    async fn test_create_answer_requires_question() {
        let (_, _, answers) = repos();

        let err = answers
            .create_answer(NewAnswer::new(42, "u1", "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, QaError::NotFound(Entity::Question)));
    }

    #[tokio::test]
    async fn test_returned_values_are_copies() {
        let (_, questions, _) = repos();

        let created = questions.create_question(NewQuestion::new("Q1")).await.unwrap();
        let mut fetched = questions.get_question(created.id).await.unwrap();
        fetched.text = "changed".to_string();

        let again = questions.get_question(created.id).await.unwrap();
        assert_eq!(again.text, "Q1");
        assert_eq!(again.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let (_, questions, answers) = repos();

        let question = questions.create_question(NewQuestion::new("Q1")).await.unwrap();
        questions.delete_question(question.id).await.unwrap();
        let err = questions.delete_question(question.id).await.unwrap_err();
        assert!(matches!(err, QaError::NotFound(Entity::Question)));

        let err = answers.delete_answer(999).await.unwrap_err();
        assert!(matches!(err, QaError::NotFound(Entity::Answer)));
    }

    #[tokio::test]
    async fn test_question_delete_does_not_cascade() {
        let (_, questions, answers) = repos();

        let question = questions.create_question(NewQuestion::new("Q1")).await.unwrap();
        let answer = answers
            .create_answer(NewAnswer::new(question.id, "u1", "A1"))
            .await
            .unwrap();

        questions.delete_question(question.id).await.unwrap();
        assert_eq!(answers.get_answer(answer.id).await.unwrap(), answer);

        let purged = answers
            .delete_answers_for_question(question.id)
            .await
            .unwrap();
        assert_eq!(purged, 1);
        assert!(answers.get_answer(answer.id).await.is_err());
    }

    #[tokio::test]
    async fn test_seed_advances_counter() {
        let (store, questions, _) = repos();

        store
            .seed_question(NewQuestion::new("seeded").into_question(5, Utc::now()))
            .await;
        let next = questions.create_question(NewQuestion::new("next")).await.unwrap();
        assert_eq!(next.id, 6);
        assert_eq!(questions.get_question(5).await.unwrap().text, "seeded");
    }

    #[tokio::test]
    async fn test_concurrent_answer_creation() {
        let (_, questions, answers) = repos();
        let answers = Arc::new(answers);

        let question = questions.create_question(NewQuestion::new("Q1")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..50 {
            let answers = answers.clone();
            handles.push(tokio::spawn(async move {
                answers
                    .create_answer(NewAnswer::new(question.id, format!("u{}", i), "A"))
                    .await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap().id);
        }

        assert_eq!(ids.len(), 50);
        let fetched = questions.get_question(question.id).await.unwrap();
        assert_eq!(fetched.answers.len(), 50);
    }
}
