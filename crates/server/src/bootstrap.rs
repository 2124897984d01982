use std::sync::Arc;

use studybot_agent::ChatbotService;
use studybot_core::config::{AppConfig, ConfigError, LoadOptions};
use studybot_core::ProviderError;
use studybot_jenkins::JenkinsClient;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub service: Arc<ChatbotService<JenkinsClient>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("jenkins client setup failed: {0}")]
    JenkinsClient(#[source] ProviderError),
}

#[cfg_attr(not(test), allow(dead_code))]
pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let client = JenkinsClient::new(&config.jenkins).map_err(BootstrapError::JenkinsClient)?;
    info!(
        event_name = "system.bootstrap.jenkins_configured",
        correlation_id = "bootstrap",
        jenkins_url = %client.base_url(),
        authenticated = config.jenkins.username.is_some(),
        "jenkins job provider configured"
    );

    Ok(Application { config, service: Arc::new(ChatbotService::new(client)) })
}
