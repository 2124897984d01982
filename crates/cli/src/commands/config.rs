use std::env;
use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use studybot_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let api_token = config
        .jenkins
        .api_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let entries = [
        (
            "jenkins.base_url",
            config.jenkins.base_url.clone(),
            source("jenkins.base_url", &["STUDYBOT_JENKINS_BASE_URL"]),
        ),
        (
            "jenkins.username",
            config.jenkins.username.clone().unwrap_or_else(|| "<unset>".to_string()),
            source("jenkins.username", &["STUDYBOT_JENKINS_USERNAME"]),
        ),
        ("jenkins.api_token", api_token, source("jenkins.api_token", &["STUDYBOT_JENKINS_API_TOKEN"])),
        (
            "jenkins.timeout_secs",
            config.jenkins.timeout_secs.to_string(),
            source("jenkins.timeout_secs", &["STUDYBOT_JENKINS_TIMEOUT_SECS"]),
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            source("server.bind_address", &["STUDYBOT_SERVER_BIND_ADDRESS"]),
        ),
        (
            "server.port",
            config.server.port.to_string(),
            source("server.port", &["STUDYBOT_SERVER_PORT"]),
        ),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            source("server.graceful_shutdown_secs", &["STUDYBOT_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
        ),
        (
            "chat.default_student_id",
            config.chat.default_student_id.clone(),
            source("chat.default_student_id", &["STUDYBOT_CHAT_DEFAULT_STUDENT_ID"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["STUDYBOT_LOGGING_LEVEL", "STUDYBOT_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            source("logging.format", &["STUDYBOT_LOGGING_FORMAT", "STUDYBOT_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(|(key, value, source)| render_line(key, value, source)));
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps at most the first four characters of a Jenkins API token.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.char_indices().nth(4) {
        Some((cut, _)) if trimmed.len() > 8 => format!("{}***", &trimmed[..cut]),
        _ => "<redacted>".to_string(),
    }
}
