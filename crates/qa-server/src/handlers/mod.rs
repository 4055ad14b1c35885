//! HTTP handlers
//!
//! Every request lands in [`dispatch`], which resolves it against the route
//! table and calls the matching handler inside a panic boundary.

pub mod answers;
pub mod audit;
pub mod error;
pub mod questions;

pub use error::ApiError;

use crate::router::{self, Operation};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use qa_core::QaError;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error};

/// Largest request body read before giving up
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    match AssertUnwindSafe(handle(&state, request)).catch_unwind().await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => err.into_response(),
        Err(panic) => {
            error!(
                %method,
                %path,
                panic = %panic_message(panic.as_ref()),
                "Panic recovered"
            );
            ApiError::from(QaError::storage("request handler panicked")).into_response()
        }
    }
}

async fn handle(state: &AppState, request: Request) -> Result<Response, ApiError> {
    let operation = router::resolve(request.method(), request.uri().path())?;

    match operation {
        Operation::ListQuestions => questions::list(state).await,
        Operation::CreateQuestion => questions::create(state, read_body(request).await?).await,
        Operation::GetQuestion(id) => questions::get(state, id).await,
        Operation::DeleteQuestion(id) => questions::delete(state, id).await,
        Operation::CreateAnswer(question_id) => {
            answers::create(state, question_id, read_body(request).await?).await
        }
        Operation::GetAnswer(id) => answers::get(state, id).await,
        Operation::DeleteAnswer(id) => answers::delete(state, id).await,
    }
}

async fn read_body(request: Request) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            debug!(error = %e, "Failed to read request body");
            QaError::validation("Invalid request body").into()
        })
}

/// JSON regardless of the declared content type
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Failed to decode request body");
        QaError::validation("Invalid request body").into()
    })
}

/// Text of a panic payload, for `&str` and `String` payloads.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
