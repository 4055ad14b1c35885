//! Answer types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Question, QuestionId};

/// Server-assigned answer identity
pub type AnswerId = i64;

/// An answer to exactly one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    /// Free-form author identifier
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Owning question, when a backend chooses to embed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<Box<Question>>,
}

/// Answer creation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnswer {
    pub question_id: QuestionId,
    pub user_id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewAnswer {
    pub fn new(
        question_id: QuestionId,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            question_id,
            user_id: user_id.into(),
            text: text.into(),
            created_at: None,
        }
    }

    pub fn into_answer(self, id: AnswerId, now: DateTime<Utc>) -> Answer {
        Answer {
            id,
            question_id: self.question_id,
            user_id: self.user_id,
            text: self.text,
            created_at: self.created_at.unwrap_or(now),
            question: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_json_shape() {
        let answer = NewAnswer::new(3, "u1", "Because").into_answer(9, Utc::now());
        let json = serde_json::to_value(&answer).unwrap();

        assert_eq!(json["id"], 9);
        assert_eq!(json["question_id"], 3);
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["text"], "Because");
        assert!(json.get("question").is_none());
    }
}
