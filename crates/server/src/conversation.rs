//! HTTP surface for the conversation state machine.
//!
//! - `POST /v1/conversation/advance` takes a ConversationState and returns
//!   the state after one turn.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use cartwise_agent::AgentRuntime;
use cartwise_core::domain::conversation::ConversationState;
use cartwise_core::errors::{ApplicationError, InterfaceError};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ConversationApi {
    runtime: Arc<AgentRuntime>,
}

impl ConversationApi {
    pub fn new(runtime: Arc<AgentRuntime>) -> Self {
        Self { runtime }
    }
}

/// Failed-turn body. `message` is safe to show to the shopper; `detail`
/// carries the underlying cause for operators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

pub struct ApiError(InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match &self.0 {
            InterfaceError::BadRequest { message, .. } => {
                (StatusCode::BAD_REQUEST, "bad_request", message.clone())
            }
            InterfaceError::ServiceUnavailable { message, .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", message.clone())
            }
            InterfaceError::Internal { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", message.clone())
            }
        };
        let body = ErrorBody {
            error,
            message: self.0.user_message(),
            detail,
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(api: ConversationApi) -> Router {
    Router::new().route("/v1/conversation/advance", post(advance)).with_state(api)
}

pub async fn advance(
    State(api): State<ConversationApi>,
    payload: Result<Json<ConversationState>, JsonRejection>,
) -> Result<Json<ConversationState>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    let Json(state) = payload.map_err(|rejection| {
        ApiError(
            ApplicationError::InvalidState(rejection.body_text()).into_interface(&correlation_id),
        )
    })?;
    let incoming_messages = state.messages.len();

    match api.runtime.advance(state).await {
        Ok(next) => {
            info!(
                event_name = "api.conversation.advanced",
                correlation_id = %correlation_id,
                incoming_messages,
                outgoing_messages = next.messages.len(),
                "conversation advanced"
            );
            Ok(Json(next))
        }
        Err(error) => {
            warn!(
                event_name = "api.conversation.failed",
                correlation_id = %correlation_id,
                error_class = error.error_class(),
                error = %error,
                "conversation turn failed"
            );
            Err(ApiError(ApplicationError::from(error).into_interface(correlation_id)))
        }
    }
}
