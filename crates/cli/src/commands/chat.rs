use studybot_agent::ChatbotService;
use studybot_core::config::{AppConfig, LoadOptions};
use studybot_core::{ApplicationError, ChatMessage, ChatbotResponse, InterfaceError};
use studybot_jenkins::JenkinsClient;
use uuid::Uuid;

use crate::commands::{
    CommandResult, EXIT_CONFIG, EXIT_INTERNAL, EXIT_PROVIDER, EXIT_VALIDATION,
};

const COMMAND: &str = "chat";

pub fn run(text: &str, student_id: Option<String>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_INTERNAL,
            )
        }
    };

    let student_id = student_id
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.chat.default_student_id.clone());
    let message = ChatMessage::new(text, student_id);

    match runtime.block_on(respond(&config, &message)) {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(
                COMMAND,
                "serialization",
                error.to_string(),
                EXIT_INTERNAL,
            ),
        },
        Err(error) => {
            let failure = error.into_interface(Uuid::new_v4().to_string());
            let (error_class, exit_code) = match &failure {
                InterfaceError::BadRequest { .. } => ("validation", EXIT_VALIDATION),
                InterfaceError::ServiceUnavailable { .. } => ("provider", EXIT_PROVIDER),
                InterfaceError::Internal { .. } => ("internal", EXIT_INTERNAL),
            };
            eprintln!("correlation_id={} detail={failure}", failure.correlation_id());
            CommandResult::failure(COMMAND, error_class, failure.user_message(), exit_code)
        }
    }
}

/// A base URL that passes validation but cannot be parsed surfaces here as
/// a configuration failure rather than a provider outage.
async fn respond(
    config: &AppConfig,
    message: &ChatMessage,
) -> Result<ChatbotResponse, ApplicationError> {
    let client = JenkinsClient::new(&config.jenkins)
        .map_err(|error| ApplicationError::Configuration(error.to_string()))?;
    ChatbotService::new(client).process_message(message).await
}
