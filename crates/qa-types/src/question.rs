//! Question types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Answer;

/// Server-assigned question identity
pub type QuestionId = i64;

/// A question and, when fetched individually, the answers attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<Answer>,
}

/// Question creation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    /// Assigned by the repository when absent
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewQuestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created_at: None,
        }
    }

    /// Materialize the record once the backend has picked an identity.
    pub fn into_question(self, id: QuestionId, now: DateTime<Utc>) -> Question {
        Question {
            id,
            text: self.text,
            created_at: self.created_at.unwrap_or(now),
            answers: Vec::new(),
        }
    }
}
