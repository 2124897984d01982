use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "studybot.toml";
pub const NESTED_CONFIG_FILE: &str = "config/studybot.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jenkins: JenkinsConfig,
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct JenkinsConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub api_token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub default_student_id: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub jenkins_base_url: Option<String>,
    pub jenkins_username: Option<String>,
    pub jenkins_api_token: Option<String>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
    pub default_student_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jenkins: JenkinsConfig {
                base_url: "http://localhost:8080".to_string(),
                username: None,
                api_token: None,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                graceful_shutdown_secs: 15,
            },
            chat: ChatConfig { default_student_id: "anonymous".to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(jenkins) = patch.jenkins {
            if let Some(base_url) = jenkins.base_url {
                self.jenkins.base_url = base_url;
            }
            if let Some(username) = jenkins.username {
                self.jenkins.username = Some(username);
            }
            if let Some(api_token) = jenkins.api_token {
                self.jenkins.api_token = Some(secret_value(api_token));
            }
            if let Some(timeout_secs) = jenkins.timeout_secs {
                self.jenkins.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(chat) = patch.chat {
            if let Some(default_student_id) = chat.default_student_id {
                self.chat.default_student_id = default_student_id;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STUDYBOT_JENKINS_BASE_URL") {
            self.jenkins.base_url = value;
        }
        if let Some(value) = read_env("STUDYBOT_JENKINS_USERNAME") {
            self.jenkins.username = Some(value);
        }
        if let Some(value) = read_env("STUDYBOT_JENKINS_API_TOKEN") {
            self.jenkins.api_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("STUDYBOT_JENKINS_TIMEOUT_SECS") {
            self.jenkins.timeout_secs = parse_u64("STUDYBOT_JENKINS_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("STUDYBOT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("STUDYBOT_SERVER_PORT") {
            self.server.port = parse_u16("STUDYBOT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("STUDYBOT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("STUDYBOT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("STUDYBOT_CHAT_DEFAULT_STUDENT_ID") {
            self.chat.default_student_id = value;
        }

        let log_level =
            read_env("STUDYBOT_LOGGING_LEVEL").or_else(|| read_env("STUDYBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STUDYBOT_LOGGING_FORMAT").or_else(|| read_env("STUDYBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.jenkins_base_url {
            self.jenkins.base_url = base_url;
        }
        if let Some(username) = overrides.jenkins_username {
            self.jenkins.username = Some(username);
        }
        if let Some(api_token) = overrides.jenkins_api_token {
            self.jenkins.api_token = Some(secret_value(api_token));
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(default_student_id) = overrides.default_student_id {
            self.chat.default_student_id = default_student_id;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_jenkins(&self.jenkins)?;
        validate_server(&self.server)?;
        validate_chat(&self.chat)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_jenkins(jenkins: &JenkinsConfig) -> Result<(), ConfigError> {
    let base_url = jenkins.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "jenkins.base_url must start with http:// or https://".to_string(),
        ));
    }

    if jenkins.timeout_secs == 0 || jenkins.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "jenkins.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    let username_set =
        jenkins.username.as_ref().map(|value| !value.trim().is_empty()).unwrap_or(false);
    if username_set {
        let missing_token = jenkins
            .api_token
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing_token {
            return Err(ConfigError::Validation(
                "jenkins.api_token is required when jenkins.username is set. Create one under Jenkins > your user > Configure > API Token".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_chat(chat: &ChatConfig) -> Result<(), ConfigError> {
    if chat.default_student_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "chat.default_student_id must not be blank".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    jenkins: Option<JenkinsPatch>,
    server: Option<ServerPatch>,
    chat: Option<ChatPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct JenkinsPatch {
    base_url: Option<String>,
    username: Option<String>,
    api_token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatPatch {
    default_student_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ALL_VARS: &[&str] = &[
        "STUDYBOT_JENKINS_BASE_URL",
        "STUDYBOT_JENKINS_USERNAME",
        "STUDYBOT_JENKINS_API_TOKEN",
        "STUDYBOT_JENKINS_TIMEOUT_SECS",
        "STUDYBOT_SERVER_BIND_ADDRESS",
        "STUDYBOT_SERVER_PORT",
        "STUDYBOT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "STUDYBOT_CHAT_DEFAULT_STUDENT_ID",
        "STUDYBOT_LOGGING_LEVEL",
        "STUDYBOT_LOGGING_FORMAT",
        "STUDYBOT_LOG_LEVEL",
        "STUDYBOT_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_load_without_file_or_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.jenkins.base_url == "http://localhost:8080", "default jenkins url")?;
        ensure(config.jenkins.username.is_none(), "no default username")?;
        ensure(config.chat.default_student_id == "anonymous", "default student id")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("TEST_JENKINS_TOKEN", "11aa22bb33cc");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("studybot.toml");
            fs::write(
                &path,
                r#"
[jenkins]
base_url = "https://ci.example.edu"
username = "chatbot"
api_token = "${TEST_JENKINS_TOKEN}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.jenkins.base_url == "https://ci.example.edu", "file base url")?;
            ensure(
                config
                    .jenkins
                    .api_token
                    .as_ref()
                    .map(|token| token.expose_secret() == "11aa22bb33cc")
                    .unwrap_or(false),
                "api token should be interpolated from environment",
            )
        })();

        clear_vars(&["TEST_JENKINS_TOKEN"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::remove_var("TEST_UNDEFINED_JENKINS_URL");

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("studybot.toml");
        fs::write(&path, "[jenkins]\nbase_url = \"${TEST_UNDEFINED_JENKINS_URL}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(
                error,
                ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_UNDEFINED_JENKINS_URL"
            ),
            "missing variable should be named",
        )
    }

    #[test]
    fn require_file_fails_when_absent() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let result = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            require_file: true,
            ..LoadOptions::default()
        });
        ensure(matches!(result, Err(ConfigError::MissingConfigFile(_))), "missing file error")
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("STUDYBOT_LOG_LEVEL", "warn");
        env::set_var("STUDYBOT_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["STUDYBOT_LOG_LEVEL", "STUDYBOT_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("STUDYBOT_JENKINS_BASE_URL", "http://from-env:8080");
        env::set_var("STUDYBOT_SERVER_PORT", "4100");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("studybot.toml");
            fs::write(
                &path,
                r#"
[jenkins]
base_url = "http://from-file:8080"
timeout_secs = 12

[server]
port = 4000

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    server_port: Some(4200),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.jenkins.base_url == "http://from-env:8080", "env should beat file")?;
            ensure(config.jenkins.timeout_secs == 12, "file should beat default")?;
            ensure(config.server.port == 4200, "override should beat env")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars(&["STUDYBOT_JENKINS_BASE_URL", "STUDYBOT_SERVER_PORT"]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("STUDYBOT_JENKINS_TIMEOUT_SECS", "soon");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["STUDYBOT_JENKINS_TIMEOUT_SECS"]);

        ensure(
            matches!(
                result,
                Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "STUDYBOT_JENKINS_TIMEOUT_SECS"
            ),
            "timeout override should be rejected",
        )
    }

    #[test]
    fn username_without_token_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("STUDYBOT_JENKINS_USERNAME", "chatbot");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("jenkins.api_token")
            );
            ensure(has_message, "validation failure should mention jenkins.api_token")
        })();

        clear_vars(&["STUDYBOT_JENKINS_USERNAME"]);
        result
    }

    #[test]
    fn non_http_base_url_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                jenkins_base_url: Some("ci.example.edu".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });
        ensure(
            matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("jenkins.base_url")),
            "validation failure should mention jenkins.base_url",
        )
    }

    #[test]
    fn api_token_is_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("STUDYBOT_JENKINS_USERNAME", "chatbot");
        env::set_var("STUDYBOT_JENKINS_API_TOKEN", "token-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("token-secret-value"), "debug output should not contain token")
        })();

        clear_vars(&["STUDYBOT_JENKINS_USERNAME", "STUDYBOT_JENKINS_API_TOKEN"]);
        result
    }
}
