//! Build registry adapter over an external job provider.
//!
//! Jobs named `student-build-<digits>` or `build-<digits>` are the builds a
//! student may start. The registry never caches: every call asks the
//! provider again.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock, Mutex};

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use crate::domain::build::{BuildInfo, Job};
use crate::errors::ProviderError;

pub const STUDENT_ID_PARAM: &str = "STUDENT_ID";
pub const BUILD_NUMBER_PARAM: &str = "BUILD_NUMBER";

static BUILD_JOB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:student-build-[0-9]+|build-[0-9]+)$").expect("valid regex"));

static TRAILING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*-([0-9]+)$").expect("valid regex"));

#[async_trait]
pub trait JobProvider: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<Job>, ProviderError>;

    /// Declared parameter names of `name`, or `None` when the job does not exist.
    async fn job_parameters(&self, name: &str) -> Result<Option<Vec<String>>, ProviderError>;

    /// Queues `name`; `Ok(true)` means the provider handed back a queue entry.
    async fn schedule_job(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<bool, ProviderError>;
}

#[async_trait]
impl<P> JobProvider for Arc<P>
where
    P: JobProvider + ?Sized,
{
    async fn list_jobs(&self) -> Result<Vec<Job>, ProviderError> {
        (**self).list_jobs().await
    }

    async fn job_parameters(&self, name: &str) -> Result<Option<Vec<String>>, ProviderError> {
        (**self).job_parameters(name).await
    }

    async fn schedule_job(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<bool, ProviderError> {
        (**self).schedule_job(name, params).await
    }
}

pub struct BuildRegistry<P> {
    provider: P,
}

impl<P> BuildRegistry<P>
where
    P: JobProvider,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Builds sorted by their number *as a string*, so "10" lands before "2".
    pub async fn list_available_builds(&self) -> Result<Vec<BuildInfo>, ProviderError> {
        let jobs = self.provider.list_jobs().await?;

        let mut builds = jobs
            .into_iter()
            .filter(|job| is_build_job(&job.name))
            .map(|job| {
                let build_number = extract_build_number(&job.name);
                let description = job.description.filter(|text| !text.is_empty());
                BuildInfo { build_number, job_name: job.name, description }
            })
            .collect::<Vec<_>>();

        builds.sort_by(|left, right| left.build_number.cmp(&right.build_number));
        Ok(builds)
    }

    pub async fn find_job_by_build_number(
        &self,
        build_number: &str,
    ) -> Result<Option<String>, ProviderError> {
        let candidates = job_name_candidates(build_number);
        let jobs = self.provider.list_jobs().await?;

        Ok(jobs
            .into_iter()
            .find(|job| candidates.iter().any(|candidate| candidate == &job.name))
            .map(|job| job.name))
    }

    /// Never fails: a missing job or any provider error comes back as `false`.
    pub async fn start_build(&self, build_number: &str, student_id: &str) -> bool {
        match self.try_start_build(build_number, student_id).await {
            Ok(accepted) => accepted,
            Err(error) => {
                warn!(
                    event_name = "registry.build.schedule_failed",
                    build_number,
                    student_id,
                    error = %error,
                    "failed to schedule build"
                );
                false
            }
        }
    }

    async fn try_start_build(
        &self,
        build_number: &str,
        student_id: &str,
    ) -> Result<bool, ProviderError> {
        let Some(job_name) = self.find_job_by_build_number(build_number).await? else {
            warn!(
                event_name = "registry.build.not_found",
                build_number, "no job found for build number"
            );
            return Ok(false);
        };

        let Some(declared) = self.provider.job_parameters(&job_name).await? else {
            warn!(event_name = "registry.job.missing", job_name = %job_name, "job not found");
            return Ok(false);
        };

        let params = if declared.is_empty() {
            BTreeMap::new()
        } else {
            BTreeMap::from([
                (STUDENT_ID_PARAM.to_owned(), student_id.to_owned()),
                (BUILD_NUMBER_PARAM.to_owned(), build_number.to_owned()),
            ])
        };

        let accepted = self.provider.schedule_job(&job_name, &params).await?;
        info!(
            event_name = "registry.build.scheduled",
            job_name = %job_name,
            build_number,
            student_id,
            accepted,
            "build scheduled for student"
        );
        Ok(accepted)
    }
}

pub fn is_build_job(name: &str) -> bool {
    BUILD_JOB_RE.is_match(name)
}

fn extract_build_number(job_name: &str) -> String {
    TRAILING_NUMBER_RE
        .captures(job_name)
        .and_then(|captures| captures.get(1))
        .map(|number| number.as_str().to_owned())
        .unwrap_or_else(|| "0".to_owned())
}

/// Names a build number may resolve to, in match priority order. The padded
/// form is only offered when the number parses.
fn job_name_candidates(build_number: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(3);
    if let Ok(value) = build_number.parse::<u64>() {
        candidates.push(format!("student-build-{value:02}"));
    }
    candidates.push(format!("build-{build_number}"));
    candidates.push(format!("student-build-{build_number}"));
    candidates
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledJob {
    pub name: String,
    pub params: BTreeMap<String, String>,
}

/// Fixed job list for tests and local runs. Records every scheduling call.
#[derive(Debug, Default)]
pub struct InMemoryJobProvider {
    jobs: Vec<Job>,
    parameters: HashMap<String, Vec<String>>,
    fail_listing: bool,
    fail_scheduling: bool,
    reject_schedules: bool,
    scheduled: Mutex<Vec<ScheduledJob>>,
}

impl InMemoryJobProvider {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs, ..Self::default() }
    }

    pub fn with_parameters<I, S>(mut self, job_name: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters.insert(job_name.to_owned(), names.into_iter().map(Into::into).collect());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_scheduling(mut self) -> Self {
        self.fail_scheduling = true;
        self
    }

    pub fn rejecting_schedules(mut self) -> Self {
        self.reject_schedules = true;
        self
    }

    pub fn scheduled(&self) -> Vec<ScheduledJob> {
        self.scheduled.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

#[async_trait]
impl JobProvider for InMemoryJobProvider {
    async fn list_jobs(&self) -> Result<Vec<Job>, ProviderError> {
        if self.fail_listing {
            return Err(ProviderError::Transport("job listing unavailable".to_owned()));
        }
        Ok(self.jobs.clone())
    }

    async fn job_parameters(&self, name: &str) -> Result<Option<Vec<String>>, ProviderError> {
        if !self.jobs.iter().any(|job| job.name == name) {
            return Ok(None);
        }
        Ok(Some(self.parameters.get(name).cloned().unwrap_or_default()))
    }

    async fn schedule_job(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<bool, ProviderError> {
        if self.fail_scheduling {
            return Err(ProviderError::Status {
                status: 403,
                url: format!("memory://job/{name}/build"),
            });
        }

        self.scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ScheduledJob { name: name.to_owned(), params: params.clone() });
        Ok(!self.reject_schedules)
    }
}
