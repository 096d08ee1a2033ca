//! ARM long-running operation helpers.
//!
//! ARM answers a mutating request either with the final resource, or with
//! an `Azure-AsyncOperation` status URL, or with a `Location` URL that keeps
//! returning 202 until the work is done.

use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use serde::Deserialize;
use std::time::Duration;

pub const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// How long a caller waits for a long-running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Poll until ARM reports a terminal state.
    Completed,
    /// Return as soon as ARM accepted the request.
    Started,
}

/// Where to poll for the outcome of an accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    AsyncOperation(String),
    Location(String),
    None,
}

impl PollTarget {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        if let Some(url) = header(AZURE_ASYNC_OPERATION) {
            PollTarget::AsyncOperation(url)
        } else if let Some(url) = header(LOCATION.as_str()) {
            PollTarget::Location(url)
        } else {
            PollTarget::None
        }
    }
}

/// Handle for an operation started with [`WaitUntil::Started`].
///
/// Nothing tracks it after it is returned: the operation may still be
/// running, or may not have finished, when the process exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Resource the operation acts on.
    pub resource: String,
    /// HTTP status ARM answered the start request with.
    pub status: u16,
    /// Status URL ARM handed back, if any.
    pub poll: PollTarget,
}

impl Operation {
    /// An operation that already finished synchronously.
    pub fn is_done(&self) -> bool {
        self.status != 202
    }
}

/// Body of an `Azure-AsyncOperation` status document.
#[derive(Deserialize, Debug)]
pub struct AsyncOperationStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

impl AsyncOperationStatus {
    pub fn state(&self) -> OperationState {
        OperationState::parse(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationState {
    /// Unknown values count as still running.
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => OperationState::Succeeded,
            "failed" => OperationState::Failed,
            "canceled" | "cancelled" => OperationState::Canceled,
            _ => OperationState::InProgress,
        }
    }
}

/// ARM error envelope `{ "error": { "code", "message" } }`.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// `Retry-After` in seconds, falling back to `default`.
pub fn retry_after(headers: &HeaderMap, default: Duration) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_poll_target_prefers_async_operation() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://arm/location"));
        headers.insert(
            AZURE_ASYNC_OPERATION,
            HeaderValue::from_static("https://arm/async"),
        );
        assert_eq!(
            PollTarget::from_headers(&headers),
            PollTarget::AsyncOperation("https://arm/async".to_string())
        );

        headers.remove(AZURE_ASYNC_OPERATION);
        assert_eq!(
            PollTarget::from_headers(&headers),
            PollTarget::Location("https://arm/location".to_string())
        );
        assert_eq!(PollTarget::from_headers(&HeaderMap::new()), PollTarget::None);
    }

    #[test]
    fn test_operation_state_parse() {
        assert_eq!(OperationState::parse("Succeeded"), OperationState::Succeeded);
        assert_eq!(OperationState::parse("Failed"), OperationState::Failed);
        assert_eq!(OperationState::parse("Canceled"), OperationState::Canceled);
        assert_eq!(OperationState::parse("InProgress"), OperationState::InProgress);
        assert_eq!(OperationState::parse("Whatever"), OperationState::InProgress);
    }

    #[test]
    fn test_async_operation_status_with_error() {
        let status: AsyncOperationStatus = serde_json::from_str(
            r#"{"status":"Failed","error":{"code":"GatewaySubnetTooSmall","message":"too small"}}"#,
        )
        .unwrap();
        assert_eq!(status.state(), OperationState::Failed);
        assert_eq!(status.error.unwrap().code, "GatewaySubnetTooSmall");
    }

    #[test]
    fn test_retry_after() {
        let default = Duration::from_secs(10);
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers, default), default);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers, default), Duration::from_secs(3));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(retry_after(&headers, default), default);
    }

    #[test]
    fn test_operation_is_done() {
        let op = Operation {
            resource: "vngw".to_string(),
            status: 202,
            poll: PollTarget::None,
        };
        assert!(!op.is_done());
    }
}
