use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use studybot_agent::ChatbotService;
use studybot_core::JobProvider;
use tracing::warn;

pub struct HealthState<P> {
    service: Arc<ChatbotService<P>>,
}

impl<P> Clone for HealthState<P> {
    fn clone(&self) -> Self {
        Self { service: Arc::clone(&self.service) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub jenkins: HealthCheck,
    pub checked_at: String,
}

pub fn router<P>(service: Arc<ChatbotService<P>>) -> Router
where
    P: JobProvider + 'static,
{
    Router::new().route("/health", get(health::<P>)).with_state(HealthState { service })
}

pub async fn health<P>(State(state): State<HealthState<P>>) -> (StatusCode, Json<HealthResponse>)
where
    P: JobProvider + 'static,
{
    let jenkins = jenkins_check(state.service.registry().provider()).await;
    let ready = jenkins.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "studybot-server runtime initialized".to_string(),
        },
        jenkins,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn jenkins_check<P: JobProvider>(provider: &P) -> HealthCheck {
    match provider.list_jobs().await {
        Ok(jobs) => HealthCheck {
            status: "ready",
            detail: format!("job listing succeeded ({} jobs visible)", jobs.len()),
        },
        Err(error) => {
            warn!(
                event_name = "system.health.jenkins_degraded",
                correlation_id = "health",
                error = %error,
                "jenkins health probe failed"
            );
            HealthCheck { status: "degraded", detail: format!("job listing failed: {error}") }
        }
    }
}
