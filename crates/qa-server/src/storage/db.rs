//! SQLite database layer (embedded, no external dependencies)
//!
//! Answers are removed together with their question by the schema's
//! `ON DELETE CASCADE`; foreign keys are switched on for every connection.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qa_core::{
    Answer, AnswerId, AnswerRepo, Entity, NewAnswer, NewQuestion, QaError, Question, QuestionId,
    QuestionRepo,
};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and apply pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_url);

        if let Some(parent) = database_file(database_url).and_then(|f| f.parent().map(PathBuf::from))
        {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(&parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to SQLite database at: {}", database_url))?;

        tracing::info!("SQLite connection established, running migrations...");
        Self::run_migrations(&pool).await?;
        tracing::info!("Database initialization complete");

        Ok(Self { pool })
    }

    /// Private in-memory database. One connection that never expires, since
    /// the data lives exactly as long as it does.
    #[cfg(test)]
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        MIGRATOR
            .run(pool)
            .await
            .context("Failed to run database migrations")
    }

    pub fn question_repo(&self) -> SqlQuestionRepo {
        SqlQuestionRepo {
            pool: self.pool.clone(),
        }
    }

    pub fn answer_repo(&self) -> SqlAnswerRepo {
        SqlAnswerRepo {
            pool: self.pool.clone(),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Filesystem path named by a `sqlite:` URL, `None` for in-memory databases.
fn database_file(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

fn storage_error(err: sqlx::Error) -> QaError {
    tracing::debug!(error = %err, "sqlite operation failed");
    QaError::storage(err)
}

/// An answer insert rejected by the foreign key lost its parent between the
/// lookup and the insert.
fn answer_insert_error(err: sqlx::Error) -> QaError {
    let orphaned = err
        .as_database_error()
        .map_or(false, |db| db.is_foreign_key_violation());
    if orphaned {
        QaError::NotFound(Entity::Question)
    } else {
        storage_error(err)
    }
}

pub struct SqlQuestionRepo {
    pool: SqlitePool,
}

#[async_trait]
impl QuestionRepo for SqlQuestionRepo {
    async fn list_questions(&self) -> qa_core::Result<Vec<Question>> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            r#"
            SELECT id, text, created_at FROM questions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create_question(&self, question: NewQuestion) -> qa_core::Result<Question> {
        let created_at = question.created_at.unwrap_or_else(Utc::now);

        let result = sqlx::query(
            r#"
            INSERT INTO questions (text, created_at)
            VALUES (?1, ?2)
            "#,
        )
        .bind(&question.text)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(question.into_question(result.last_insert_rowid(), created_at))
    }

    async fn get_question(&self, id: QuestionId) -> qa_core::Result<Question> {
        // Question and its answers in one round trip
        let rows: Vec<QuestionAnswerRow> = sqlx::query_as(
            r#"
            SELECT q.id, q.text, q.created_at,
                   a.id AS answer_id, a.user_id AS answer_user_id,
                   a.text AS answer_text, a.created_at AS answer_created_at
            FROM questions q
            LEFT JOIN answers a ON a.question_id = q.id
            WHERE q.id = ?1
            ORDER BY a.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut question: Option<Question> = None;
        for row in rows {
            let (parent, answer) = row.split();
            question.get_or_insert(parent).answers.extend(answer);
        }

        question.ok_or(QaError::NotFound(Entity::Question))
    }

    async fn delete_question(&self, id: QuestionId) -> qa_core::Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM questions WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(QaError::NotFound(Entity::Question));
        }
        Ok(())
    }
}

pub struct SqlAnswerRepo {
    pool: SqlitePool,
}

#[async_trait]
impl AnswerRepo for SqlAnswerRepo {
    async fn create_answer(&self, answer: NewAnswer) -> qa_core::Result<Answer> {
        let parent: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM questions WHERE id = ?1
            "#,
        )
        .bind(answer.question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        if parent.is_none() {
            return Err(QaError::NotFound(Entity::Question));
        }

        let created_at = answer.created_at.unwrap_or_else(Utc::now);

        let result = sqlx::query(
            r#"
            INSERT INTO answers (question_id, user_id, text, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(answer.question_id)
        .bind(&answer.user_id)
        .bind(&answer.text)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(answer_insert_error)?;

        Ok(answer.into_answer(result.last_insert_rowid(), created_at))
    }

    async fn get_answer(&self, id: AnswerId) -> qa_core::Result<Answer> {
        let row: Option<AnswerRow> = sqlx::query_as(
            r#"
            SELECT id, question_id, user_id, text, created_at
            FROM answers WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(|r| r.into())
            .ok_or(QaError::NotFound(Entity::Answer))
    }

    async fn delete_answer(&self, id: AnswerId) -> qa_core::Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM answers WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(QaError::NotFound(Entity::Answer));
        }
        Ok(())
    }

    async fn delete_answers_for_question(&self, question_id: QuestionId) -> qa_core::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM answers WHERE question_id = ?1
            "#,
        )
        .bind(question_id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected())
    }
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<QuestionRow> for Question {
    fn from(r: QuestionRow) -> Self {
        Question {
            id: r.id,
            text: r.text,
            created_at: r.created_at,
            answers: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct AnswerRow {
    id: i64,
    question_id: i64,
    user_id: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<AnswerRow> for Answer {
    fn from(r: AnswerRow) -> Self {
        Answer {
            id: r.id,
            question_id: r.question_id,
            user_id: r.user_id,
            text: r.text,
            created_at: r.created_at,
            question: None,
        }
    }
}

/// One row of the question/answers join; answer columns are NULL when the
/// question has no answers.
#[derive(sqlx::FromRow)]
struct QuestionAnswerRow {
    id: i64,
    text: String,
    created_at: DateTime<Utc>,
    answer_id: Option<i64>,
    answer_user_id: Option<String>,
    answer_text: Option<String>,
    answer_created_at: Option<DateTime<Utc>>,
}

impl QuestionAnswerRow {
    fn split(self) -> (Question, Option<Answer>) {
        let answer = match (
            self.answer_id,
            self.answer_user_id,
            self.answer_text,
            self.answer_created_at,
        ) {
            (Some(id), Some(user_id), Some(text), Some(created_at)) => Some(Answer {
                id,
                question_id: self.id,
                user_id,
                text,
                created_at,
                question: None,
            }),
            _ => None,
        };

        let question = Question {
            id: self.id,
            text: self.text,
            created_at: self.created_at,
            answers: Vec::new(),
        };

        (question, answer)
    }
}
