//! Answer handlers

use super::{decode_body, ApiError};
use crate::AppState;
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use qa_core::{AnswerId, NewAnswer, QaError, QuestionId};
use serde::Deserialize;

/// Any `question_id` in the body is ignored; the path decides.
#[derive(Debug, Deserialize)]
pub struct CreateAnswerRequest {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

pub async fn create(
    state: &AppState,
    question_id: QuestionId,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: CreateAnswerRequest = decode_body(&body)?;

    if req.text.is_empty() {
        return Err(QaError::validation("Text is required").into());
    }
    if req.user_id.is_empty() {
        return Err(QaError::validation("User ID is required").into());
    }

    let answer = state
        .answers
        .create_answer(NewAnswer {
            question_id,
            user_id: req.user_id,
            text: req.text,
            created_at: req.created_at,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(answer)).into_response())
}

pub async fn get(state: &AppState, id: AnswerId) -> Result<Response, ApiError> {
    let answer = state.answers.get_answer(id).await?;
    Ok(Json(answer).into_response())
}

pub async fn delete(state: &AppState, id: AnswerId) -> Result<Response, ApiError> {
    state.answers.delete_answer(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
