use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use studybot_agent::ChatbotService;
use studybot_core::{BuildInfo, ChatMessage, ChatbotResponse, InterfaceError, JobProvider};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const BUILD_STARTED_MESSAGE: &str = "Build started successfully!";
pub const BUILD_START_FAILED_MESSAGE: &str = "Failed to start build";
pub const BUILD_LISTING_FAILED_MESSAGE: &str = "Error retrieving builds";

pub struct ChatState<P> {
    service: Arc<ChatbotService<P>>,
    default_student_id: Arc<str>,
}

impl<P> Clone for ChatState<P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            default_student_id: Arc::clone(&self.default_student_id),
        }
    }
}

impl<P> ChatState<P> {
    fn student_id(&self, supplied: Option<String>) -> String {
        supplied
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.default_student_id.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Envelope<T> {
    Ok { data: T },
    Error { message: String },
}

impl<T> Envelope<T> {
    fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatForm {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    student_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    #[serde(default)]
    student_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBuildForm {
    #[serde(default)]
    build_number: Option<String>,
    #[serde(default)]
    student_id: Option<String>,
}

/// Routes are relative; the caller nests them under the plugin prefix.
pub fn router<P>(service: Arc<ChatbotService<P>>, default_student_id: &str) -> Router
where
    P: JobProvider + 'static,
{
    let state = ChatState { service, default_student_id: Arc::from(default_student_id) };
    Router::new()
        .route("/chat", post(chat::<P>))
        .route("/builds", get(builds::<P>))
        .route("/builds/start", post(start_build::<P>))
        .with_state(state)
}

pub async fn chat<P>(
    State(state): State<ChatState<P>>,
    Form(form): Form<ChatForm>,
) -> (StatusCode, Json<Envelope<ChatbotResponse>>)
where
    P: JobProvider + 'static,
{
    let correlation_id = Uuid::new_v4().to_string();
    let student_id = state.student_id(form.student_id);
    let message = ChatMessage::new(form.message.unwrap_or_default(), student_id);

    match state.service.process_message(&message).await {
        Ok(response) => {
            info!(
                event_name = "server.chat.replied",
                correlation_id = %correlation_id,
                student_id = %message.student_id,
                message_type = response.kind().as_str(),
                "chat message answered"
            );
            (StatusCode::OK, Json(Envelope::Ok { data: response }))
        }
        Err(source) => {
            let failure = source.into_interface(correlation_id);
            let status = match &failure {
                InterfaceError::BadRequest { .. } => {
                    warn!(
                        event_name = "server.chat.rejected",
                        correlation_id = failure.correlation_id(),
                        student_id = %message.student_id,
                        error = %failure,
                        "chat message rejected"
                    );
                    StatusCode::BAD_REQUEST
                }
                InterfaceError::ServiceUnavailable { .. } | InterfaceError::Internal { .. } => {
                    error!(
                        event_name = "server.chat.failed",
                        correlation_id = failure.correlation_id(),
                        student_id = %message.student_id,
                        error = %failure,
                        "chat message processing failed"
                    );
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(Envelope::error(failure.user_message())))
        }
    }
}

pub async fn builds<P>(
    State(state): State<ChatState<P>>,
    Query(query): Query<StudentQuery>,
) -> (StatusCode, Json<Envelope<Vec<BuildInfo>>>)
where
    P: JobProvider + 'static,
{
    let correlation_id = Uuid::new_v4().to_string();
    let student_id = state.student_id(query.student_id);

    match state.service.available_builds().await {
        Ok(builds) => {
            info!(
                event_name = "server.builds.listed",
                correlation_id = %correlation_id,
                student_id = %student_id,
                build_count = builds.len(),
                "available builds listed"
            );
            (StatusCode::OK, Json(Envelope::Ok { data: builds }))
        }
        Err(source) => {
            error!(
                event_name = "server.builds.failed",
                correlation_id = %correlation_id,
                student_id = %student_id,
                error = %source,
                "listing available builds failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Envelope::error(BUILD_LISTING_FAILED_MESSAGE)))
        }
    }
}

pub async fn start_build<P>(
    State(state): State<ChatState<P>>,
    Form(form): Form<StartBuildForm>,
) -> (StatusCode, Json<Envelope<&'static str>>)
where
    P: JobProvider + 'static,
{
    let correlation_id = Uuid::new_v4().to_string();
    let student_id = state.student_id(form.student_id);
    let build_number = form.build_number.unwrap_or_default();
    let build_number = build_number.trim();

    let started =
        !build_number.is_empty() && state.service.start_build(build_number, &student_id).await;

    info!(
        event_name = "server.builds.start_requested",
        correlation_id = %correlation_id,
        student_id = %student_id,
        build_number = %build_number,
        started,
        "direct build start handled"
    );

    if started {
        (StatusCode::OK, Json(Envelope::Ok { data: BUILD_STARTED_MESSAGE }))
    } else {
        (StatusCode::BAD_REQUEST, Json(Envelope::error(BUILD_START_FAILED_MESSAGE)))
    }
}
