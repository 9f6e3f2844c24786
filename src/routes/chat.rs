use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{Instrument, error, info_span};
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, MESSAGE_REQUIRED},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    // Apart from an oversized body, an unreadable body has no message in it either.
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(%rejection, "rejected chat body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest(MESSAGE_REQUIRED.to_string())
        }
    })?;
    let turn = request.validate()?;

    let span = info_span!("chat_turn", turn_id = %Uuid::new_v4(), session = %turn.session_id);
    async move {
        let handle = state
            .sessions
            .get_or_create(&turn.session_id, state.provider.as_ref())
            .await;

        let reply = handle
            .send_turn(state.provider.as_ref(), &turn.message)
            .await
            .inspect_err(|err| error!(error = %err, detail = ?err, "provider call failed"))?;

        Ok::<_, AppError>(Json(ChatResponse { reply }))
    }
    .instrument(span)
    .await
}
