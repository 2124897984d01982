//! Jenkins job provider
//!
//! Implements [`JobProvider`] over the Jenkins remote access API:
//! - `GET /api/json?tree=jobs[...]` lists top-level jobs
//! - `GET /job/<name>/api/json?tree=property[...]` reads declared parameters
//! - `POST /job/<name>/build` or `/buildWithParameters` queues a build
//!
//! Authentication is HTTP basic with a user name and API token, which Jenkins
//! accepts for POSTs without a CSRF crumb.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use studybot_core::config::JenkinsConfig;
use studybot_core::{Job, JobProvider, ProviderError};
use tracing::debug;

const JOB_LIST_TREE: &str = "jobs[name,description,_class]";
const JOB_PARAMETERS_TREE: &str = "property[parameterDefinitions[name]]";

pub struct JenkinsClient {
    client: Client,
    base_url: Url,
    credentials: Option<(String, SecretString)>,
}

impl JenkinsClient {
    pub fn new(config: &JenkinsConfig) -> Result<Self, ProviderError> {
        let raw = config.base_url.trim();
        let base_url = Url::parse(raw)
            .map_err(|error| ProviderError::InvalidUrl(format!("`{raw}`: {error}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidUrl(format!("`{raw}` cannot carry a path")));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        let credentials = match (&config.username, &config.api_token) {
            (Some(username), Some(token)) if !username.trim().is_empty() => {
                Some((username.trim().to_owned(), token.clone()))
            }
            _ => None,
        };

        Ok(Self { client, base_url, credentials })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ProviderError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn job_endpoint(&self, job_name: &str, tail: &[&str]) -> Result<Url, ProviderError> {
        let mut segments = vec!["job", job_name];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.credentials {
            Some((username, token)) => builder.basic_auth(username, Some(token.expose_secret())),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ProviderError> {
        builder.send().await.map_err(|error| ProviderError::Transport(error.to_string()))
    }

    /// `Ok(None)` on 404; any other non-success status is an error.
    async fn get_json<T>(&self, mut url: Url, tree: &str) -> Result<Option<T>, ProviderError>
    where
        T: DeserializeOwned,
    {
        url.query_pairs_mut().append_pair("tree", tree);
        debug!(event_name = "jenkins.request", method = "GET", url = %url, "calling jenkins");

        let response = self.send(self.request(Method::GET, url.clone())).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16(), url: url.to_string() });
        }

        response.json::<T>().await.map(Some).map_err(|error| ProviderError::Decode(error.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct JobListPayload {
    #[serde(default)]
    jobs: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "_class", default)]
    class: Option<String>,
}

impl JobEntry {
    fn is_container(&self) -> bool {
        self.class
            .as_deref()
            .map(|class| class.contains("Folder") || class.contains("MultiBranch"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct JobPropertiesPayload {
    #[serde(default)]
    property: Vec<JobProperty>,
}

#[derive(Debug, Deserialize)]
struct JobProperty {
    #[serde(rename = "parameterDefinitions", default)]
    parameter_definitions: Option<Vec<ParameterDefinition>>,
}

#[derive(Debug, Deserialize)]
struct ParameterDefinition {
    name: String,
}

#[async_trait]
impl JobProvider for JenkinsClient {
    async fn list_jobs(&self) -> Result<Vec<Job>, ProviderError> {
        let url = self.endpoint(&["api", "json"])?;
        let payload = self
            .get_json::<JobListPayload>(url.clone(), JOB_LIST_TREE)
            .await?
            .ok_or_else(|| ProviderError::Status { status: 404, url: url.to_string() })?;

        Ok(payload
            .jobs
            .into_iter()
            .filter(|entry| !entry.is_container())
            .map(|entry| Job { name: entry.name, description: entry.description })
            .collect())
    }

    async fn job_parameters(&self, name: &str) -> Result<Option<Vec<String>>, ProviderError> {
        let url = self.job_endpoint(name, &["api", "json"])?;
        let Some(payload) = self.get_json::<JobPropertiesPayload>(url, JOB_PARAMETERS_TREE).await?
        else {
            return Ok(None);
        };

        Ok(Some(
            payload
                .property
                .into_iter()
                .flat_map(|property| property.parameter_definitions.unwrap_or_default())
                .map(|definition| definition.name)
                .collect(),
        ))
    }

    async fn schedule_job(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<bool, ProviderError> {
        let action = if params.is_empty() { "build" } else { "buildWithParameters" };
        let url = self.job_endpoint(name, &[action])?;
        debug!(event_name = "jenkins.request", method = "POST", url = %url, "calling jenkins");

        let mut builder = self.request(Method::POST, url.clone());
        if !params.is_empty() {
            builder = builder.form(params);
        }

        let response = self.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16(), url: url.to_string() });
        }

        // Jenkins answers 201 with the queue item in `Location`
        Ok(response.headers().contains_key(LOCATION))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use secrecy::SecretString;
    use serde_json::json;
    use studybot_core::config::JenkinsConfig;
    use studybot_core::{Job, JobProvider, ProviderError};
    use wiremock::matchers::{basic_auth, body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::JenkinsClient;

    fn config(base_url: &str) -> JenkinsConfig {
        JenkinsConfig {
            base_url: base_url.to_owned(),
            username: None,
            api_token: None,
            timeout_secs: 5,
        }
    }

    fn client(base_url: &str) -> JenkinsClient {
        JenkinsClient::new(&config(base_url)).expect("client")
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            JenkinsClient::new(&config("not a url")),
            Err(ProviderError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn lists_jobs_and_skips_folders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/json"))
            .and(query_param("tree", "jobs[name,description,_class]"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_class": "hudson.model.Hudson",
                "jobs": [
                    {"_class": "hudson.model.FreeStyleProject", "name": "student-build-01", "description": "Intro"},
                    {"_class": "com.cloudbees.hudson.plugins.folder.Folder", "name": "build-9"},
                    {"_class": "org.jenkinsci.plugins.workflow.job.WorkflowJob", "name": "build-3", "description": null}
                ]
            })))
            .mount(&server)
            .await;

        let jobs = client(&server.uri()).list_jobs().await.expect("list");
        assert_eq!(
            jobs,
            vec![Job::described("student-build-01", "Intro"), Job::new("build-3")]
        );
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jenkins/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobs": []})))
            .mount(&server)
            .await;

        let jobs = client(&format!("{}/jenkins/", server.uri())).list_jobs().await.expect("list");
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn listing_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let error = client(&server.uri()).list_jobs().await.expect_err("unavailable");
        assert!(matches!(error, ProviderError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
            let address = listener.local_addr().expect("local address");
            format!("http://{address}")
        };

        let error = client(&uri).list_jobs().await.expect_err("unreachable");
        assert!(matches!(error, ProviderError::Transport(_)));
    }

    #[tokio::test]
    async fn reads_declared_parameter_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/job/student-build-03/api/json"))
            .and(query_param("tree", "property[parameterDefinitions[name]]"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "property": [
                    {"_class": "jenkins.model.BuildDiscarderProperty"},
                    {"_class": "hudson.model.ParametersDefinitionProperty",
                     "parameterDefinitions": [{"name": "STUDENT_ID"}, {"name": "BUILD_NUMBER"}]}
                ]
            })))
            .mount(&server)
            .await;

        let params = client(&server.uri()).job_parameters("student-build-03").await.expect("params");
        assert_eq!(params, Some(vec!["STUDENT_ID".to_owned(), "BUILD_NUMBER".to_owned()]));
    }

    #[tokio::test]
    async fn missing_job_has_no_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/job/build-4/api/json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert_eq!(client(&server.uri()).job_parameters("build-4").await.expect("params"), None);
    }

    #[tokio::test]
    async fn schedules_plain_build_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/build-3/build"))
            .and(basic_auth("chatbot", "api-token"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", format!("{}/queue/item/17/", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = JenkinsClient::new(&JenkinsConfig {
            username: Some("chatbot".to_owned()),
            api_token: Some(SecretString::from("api-token".to_owned())),
            ..config(&server.uri())
        })
        .expect("client");

        assert!(client.schedule_job("build-3", &BTreeMap::new()).await.expect("schedule"));
    }

    #[tokio::test]
    async fn schedules_parameterised_build_with_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/student-build-03/buildWithParameters"))
            .and(body_string_contains("STUDENT_ID=s-1"))
            .and(body_string_contains("BUILD_NUMBER=3"))
            .respond_with(ResponseTemplate::new(201).insert_header("Location", "/queue/item/18/"))
            .expect(1)
            .mount(&server)
            .await;

        let params = BTreeMap::from([
            ("STUDENT_ID".to_owned(), "s-1".to_owned()),
            ("BUILD_NUMBER".to_owned(), "3".to_owned()),
        ]);
        assert!(client(&server.uri())
            .schedule_job("student-build-03", &params)
            .await
            .expect("schedule"));
    }

    #[tokio::test]
    async fn success_without_queue_location_is_not_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/build-3/build"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(!client(&server.uri()).schedule_job("build-3", &BTreeMap::new()).await.expect("ok"));
    }

    #[tokio::test]
    async fn forbidden_schedule_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/build-3/build"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let error = client(&server.uri())
            .schedule_job("build-3", &BTreeMap::new())
            .await
            .expect_err("forbidden");
        assert!(matches!(error, ProviderError::Status { status: 403, .. }));
    }
}
