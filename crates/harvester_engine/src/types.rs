use std::fmt;

use harvester_core::RunStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reported once per search, with `completed == total ==` the number of
    /// instances it returned.
    Discovering,
    Summarizing,
    Harvesting,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestProgress {
    pub stage: Stage,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(HarvestProgress),
    RunCompleted(RunStats),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Search,
    TaskSummary,
    TaskDetail,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::Search => write!(f, "search"),
            EndpointKind::TaskSummary => write!(f, "task summary"),
            EndpointKind::TaskDetail => write!(f, "task detail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    AuthResolutionFailed,
    InvalidUrl,
    HttpStatus {
        status: u16,
        server_message: Option<String>,
    },
    Timeout,
    Transport,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::AuthResolutionFailed => write!(f, "credential resolution failed"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus {
                status,
                server_message: Some(message),
            } => write!(f, "http status {status} ({message})"),
            FailureKind::HttpStatus {
                status,
                server_message: None,
            } => write!(f, "http status {status}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Transport => write!(f, "transport error"),
            FailureKind::Decode => write!(f, "decode error"),
        }
    }
}
