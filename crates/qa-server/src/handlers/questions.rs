//! Question handlers

use super::{decode_body, ApiError};
use crate::AppState;
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use qa_core::{NewQuestion, QaError, QuestionId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    #[serde(default)]
    text: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

pub async fn list(state: &AppState) -> Result<Response, ApiError> {
    let questions = state.questions.list_questions().await?;
    Ok(Json(questions).into_response())
}

pub async fn create(state: &AppState, body: Bytes) -> Result<Response, ApiError> {
    let req: CreateQuestionRequest = decode_body(&body)?;

    if req.text.is_empty() {
        return Err(QaError::validation("Text is required").into());
    }

    let question = state
        .questions
        .create_question(NewQuestion {
            text: req.text,
            created_at: req.created_at,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(question)).into_response())
}

pub async fn get(state: &AppState, id: QuestionId) -> Result<Response, ApiError> {
    let question = state.questions.get_question(id).await?;
    Ok(Json(question).into_response())
}

pub async fn delete(state: &AppState, id: QuestionId) -> Result<Response, ApiError> {
    state.questions.delete_question(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
