use serde::Serialize;

use crate::domain::build::BuildInfo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Help,
    BuildList,
    NoBuilds,
    BuildNotFound,
    BuildStarted,
    BuildFailed,
    Greeting,
    Default,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::BuildList => "build_list",
            Self::NoBuilds => "no_builds",
            Self::BuildNotFound => "build_not_found",
            Self::BuildStarted => "build_started",
            Self::BuildFailed => "build_failed",
            Self::Greeting => "greeting",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    None,
    Build(BuildInfo),
    Builds(Vec<BuildInfo>),
}

/// The single output of message processing.
///
/// Fields are private and every constructor fixes the kind together with
/// the payload shape, so a `build_started` response always carries exactly
/// one [`BuildInfo`], a `build_list` carries the listing, and every other
/// kind carries nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatbotResponse {
    message: String,
    #[serde(rename = "messageType")]
    kind: ResponseKind,
    #[serde(rename = "data")]
    payload: ResponsePayload,
}

impl ChatbotResponse {
    fn text_only(kind: ResponseKind, message: impl Into<String>) -> Self {
        Self { message: message.into(), kind, payload: ResponsePayload::None }
    }

    pub fn help(message: impl Into<String>) -> Self {
        Self::text_only(ResponseKind::Help, message)
    }

    pub fn build_list(message: impl Into<String>, builds: Vec<BuildInfo>) -> Self {
        Self {
            message: message.into(),
            kind: ResponseKind::BuildList,
            payload: ResponsePayload::Builds(builds),
        }
    }

    pub fn no_builds(message: impl Into<String>) -> Self {
        Self::text_only(ResponseKind::NoBuilds, message)
    }

    pub fn build_not_found(message: impl Into<String>) -> Self {
        Self::text_only(ResponseKind::BuildNotFound, message)
    }

    pub fn build_started(message: impl Into<String>, build: BuildInfo) -> Self {
        Self {
            message: message.into(),
            kind: ResponseKind::BuildStarted,
            payload: ResponsePayload::Build(build),
        }
    }

    pub fn build_failed(message: impl Into<String>) -> Self {
        Self::text_only(ResponseKind::BuildFailed, message)
    }

    pub fn greeting(message: impl Into<String>) -> Self {
        Self::text_only(ResponseKind::Greeting, message)
    }

    pub fn default_reply(message: impl Into<String>) -> Self {
        Self::text_only(ResponseKind::Default, message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    pub fn payload(&self) -> &ResponsePayload {
        &self.payload
    }
}
