use std::fmt::Write as _;

use studybot_core::{BuildInfo, ChatbotResponse};

pub const BUILD_STARTED_DESCRIPTION: &str = "Build started successfully";

pub fn help() -> ChatbotResponse {
    ChatbotResponse::help(
        "👋 Hi! I'm your Jenkins build assistant. Here's what I can help you with:\n\n\
         • **list** or **show builds** - See available builds\n\
         • **build 1** or **start 1** - Start build number 1\n\
         • **build 2** or **run 2** - Start build number 2\n\
         • **help** - Show this help message\n\n\
         Type **build** followed by a number (like 'build 1') to start that build!",
    )
}

pub fn build_list(builds: Vec<BuildInfo>) -> ChatbotResponse {
    if builds.is_empty() {
        return ChatbotResponse::no_builds(
            "No builds are currently available. Please contact your instructor.",
        );
    }

    let mut text = String::from("📋 **Available Builds:**\n\n");
    for build in &builds {
        let _ = write!(text, "**Build {}** - {}", build.build_number, build.job_name);
        if let Some(description) = build.description.as_deref().filter(|value| !value.is_empty()) {
            let _ = write!(text, "\n   {description}");
        }
        text.push_str("\n\n");
    }
    text.push_str("Type **build X** (where X is the number) to start a build!");

    ChatbotResponse::build_list(text, builds)
}

pub fn build_not_found(build_number: &str) -> ChatbotResponse {
    ChatbotResponse::build_not_found(format!(
        "❌ Build {build_number} not found. Type **list** to see available builds."
    ))
}

pub fn build_started(build_number: &str, job_name: &str) -> ChatbotResponse {
    ChatbotResponse::build_started(
        format!(
            "🚀 **Build {build_number} started!**\n\n\
             Your build has been queued and will start shortly. \
             You can monitor its progress in the Jenkins dashboard."
        ),
        BuildInfo::new(build_number, job_name, Some(BUILD_STARTED_DESCRIPTION.to_owned())),
    )
}

pub fn build_failed(build_number: &str) -> ChatbotResponse {
    ChatbotResponse::build_failed(format!(
        "❌ Failed to start build {build_number}. Please try again or contact your instructor."
    ))
}

pub fn greeting() -> ChatbotResponse {
    ChatbotResponse::greeting(
        "👋 Hello! I'm here to help you start your Jenkins builds.\n\n\
         Type **list** to see available builds, or **help** for more options.",
    )
}

pub fn not_understood() -> ChatbotResponse {
    ChatbotResponse::default_reply(
        "🤔 I'm not sure what you mean. Try:\n\
         • **list** - to see available builds\n\
         • **build X** - to start build number X\n\
         • **help** - for more options",
    )
}
