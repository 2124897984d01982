//! Intent classification for inbound chat messages.
//!
//! Four literal patterns are tried in a fixed order and the first hit wins:
//! help, list, start-build, greeting. Anything else is [`Intent::Unknown`].

use std::sync::LazyLock;

use regex::Regex;

static HELP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"help|\?|what|how").expect("valid regex"));

static LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"list|show|available|builds").expect("valid regex"));

// Only ASCII whitespace may separate the verb from its number.
static START_BUILD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:build|start|run)(?-u:\s)*([0-9]+)").expect("valid regex"));

// The tail stops at any line terminator, so a greeting must fill the first
// line entirely.
static GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:hi|hello|hey|good morning|good afternoon)[^\n\r\x{85}\x{2028}\x{2029}]*$")
        .expect("valid regex")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Help,
    ListBuilds,
    /// The digits exactly as typed, leading zeros included.
    StartBuild { number: String },
    Greeting,
    Unknown,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::ListBuilds => "list_builds",
            Self::StartBuild { .. } => "start_build",
            Self::Greeting => "greeting",
            Self::Unknown => "unknown",
        }
    }
}

pub fn classify(text: &str) -> Intent {
    let normalized = text.trim().to_lowercase();

    if HELP_RE.is_match(&normalized) {
        return Intent::Help;
    }

    if LIST_RE.is_match(&normalized) {
        return Intent::ListBuilds;
    }

    if let Some(captures) = START_BUILD_RE.captures(&normalized) {
        if let Some(number) = captures.get(1) {
            return Intent::StartBuild { number: number.as_str().to_owned() };
        }
    }

    if GREETING_RE.is_match(&normalized) {
        return Intent::Greeting;
    }

    Intent::Unknown
}
