use serde::{Deserialize, Serialize};

/// A schedulable job as the student sees it: the short number they type and
/// the job it resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub build_number: String,
    pub job_name: String,
    pub description: Option<String>,
}

impl BuildInfo {
    pub fn new(
        build_number: impl Into<String>,
        job_name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self { build_number: build_number.into(), job_name: job_name.into(), description }
    }
}

/// A job definition as reported by the job provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub description: Option<String>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None }
    }

    pub fn described(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: Some(description.into()) }
    }
}
