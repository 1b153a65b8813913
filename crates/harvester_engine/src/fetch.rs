use std::sync::Arc;
use std::time::Duration;

use engine_logging::engine_debug;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::credentials::CredentialResolver;
use crate::{EndpointKind, FailureKind, FetchError};

const SEARCH_PATH: &str = "rest/bpm/wle/v1/processes/search";
const PROCESS_PATH: &str = "rest/bpm/wle/v1/process/";
const TASK_PATH: &str = "rest/bpm/wle/v1/task/";
const TASK_SUMMARY_SEGMENT: &str = "taskSummary";
const TASK_DETAIL_QUERY: &str = "parts=data";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Skip TLS certificate validation. Workflow servers are commonly
    /// deployed with self-signed certificates, so this defaults to `true`;
    /// set it to `false` when the server presents a trusted chain.
    pub accept_invalid_certs: bool,
    /// `None` leaves connection setup unbounded.
    pub connect_timeout: Option<Duration>,
    /// `None` leaves requests open-ended; long task-detail reads are normal.
    pub request_timeout: Option<Duration>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

/// One of the three REST resources the harvester reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Search { query: Vec<(String, String)> },
    TaskSummary { instance_id: String },
    TaskDetail { task_id: String },
}

impl Endpoint {
    pub fn kind(&self) -> EndpointKind {
        match self {
            Endpoint::Search { .. } => EndpointKind::Search,
            Endpoint::TaskSummary { .. } => EndpointKind::TaskSummary,
            Endpoint::TaskDetail { .. } => EndpointKind::TaskDetail,
        }
    }

    /// Resolves the endpoint under `root`, which must end with `/`.
    pub fn url(&self, root: &Url) -> Result<Url, FetchError> {
        match self {
            Endpoint::Search { query } => {
                let mut url = join(root, SEARCH_PATH)?;
                url.query_pairs_mut().extend_pairs(query);
                Ok(url)
            }
            Endpoint::TaskSummary { instance_id } => {
                let mut url = join(root, PROCESS_PATH)?;
                url.path_segments_mut()
                    .map_err(|_| invalid_base(root))?
                    .pop_if_empty()
                    .push(instance_id)
                    .push(TASK_SUMMARY_SEGMENT)
                    .push("");
                Ok(url)
            }
            Endpoint::TaskDetail { task_id } => {
                let mut url = join(root, TASK_PATH)?;
                url.path_segments_mut()
                    .map_err(|_| invalid_base(root))?
                    .pop_if_empty()
                    .push(task_id);
                url.set_query(Some(TASK_DETAIL_QUERY));
                Ok(url)
            }
        }
    }
}

fn join(root: &Url, path: &str) -> Result<Url, FetchError> {
    root.join(path)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
}

fn invalid_base(root: &Url) -> FetchError {
    FetchError::new(
        FailureKind::InvalidUrl,
        format!("{root} cannot be used as a base url"),
    )
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues one authenticated GET and returns the parsed JSON body of a
    /// 200 response.
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, FetchError>;
}

#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    root: Url,
    credentials: Arc<dyn CredentialResolver>,
}

impl ReqwestFetcher {
    pub fn new(
        settings: FetchSettings,
        root: Url,
        credentials: Arc<dyn CredentialResolver>,
    ) -> Result<Self, FetchError> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(settings.accept_invalid_certs);
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Transport, err.to_string()))?;

        Ok(Self {
            client,
            root,
            credentials,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let credential = self.credentials.resolve()?;
        let url = endpoint.url(&self.root)?;
        engine_debug!("GET {} {}", endpoint.kind(), url);

        let response = self
            .client
            .get(url)
            .basic_auth(&credential.user, Some(&credential.password))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if status != StatusCode::OK {
            return Err(FetchError::new(
                FailureKind::HttpStatus {
                    status: status.as_u16(),
                    server_message: server_error_message(&body),
                },
                status.to_string(),
            ));
        }

        serde_json::from_str(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Transport, err.to_string())
}

/// Error bodies carry the message under `Data.errorMessage`; some server
/// versions use a lowercase `data` or a top-level field.
fn server_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["/Data/errorMessage", "/data/errorMessage", "/errorMessage"]
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
        .map(str::to_string)
}

/// Takes the top-level `data` object out of a response body.
pub(crate) fn data_section(body: Value, kind: EndpointKind) -> Result<Value, FetchError> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data @ Value::Object(_)) => Ok(data),
            _ => Err(FetchError::new(
                FailureKind::Decode,
                format!("{kind} response has no `data` object"),
            )),
        },
        _ => Err(FetchError::new(
            FailureKind::Decode,
            format!("{kind} response is not a JSON object"),
        )),
    }
}
