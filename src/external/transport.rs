//! Transport abstraction for the createMessage call.

use super::client::build_http_client;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A fully prepared POST request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Raw response of a successful exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Transport-level failure
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, timeout or body read failure
    #[error("HTTP request failed")]
    Request {
        #[source]
        source: reqwest::Error,
    },

    /// Failure reported by a non-reqwest transport
    #[error("Transport failure: {message}")]
    Other { message: String },
}

impl TransportError {
    /// Whether the server itself failed (5xx)
    pub fn is_server_error(&self) -> bool {
        matches!(self, TransportError::Status { status, .. } if (500..600).contains(status))
    }
}

/// Trait for sending prepared requests to the Pushwoosh API
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// Implementations must be Send + Sync so one client can be shared
/// between tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response of a 2xx exchange
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;

    /// Classifies a failure as a transient server error worth one retry
    fn is_transient_server_error(&self, error: &TransportError) -> bool {
        error.is_server_error()
    }

    /// Transport name for logging
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Default transport backed by `reqwest`
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Creates a transport with its own client using the given timeouts
    pub fn with_timeouts(
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(request_timeout, connect_timeout)?))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self.client.post(&request.url).body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| TransportError::Request { source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Request { source })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::with_timeouts(Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    fn request(url: String) -> ApiRequest {
        ApiRequest {
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: r#"{"hello":"world"}"#.to_string(),
        }
    }

    #[test]
    fn test_server_error_classification() {
        let err = TransportError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_server_error());
        assert!(transport().is_transient_server_error(&err));

        let err = TransportError::Status {
            status: 404,
            body: String::new(),
        };
        assert!(!err.is_server_error());

        let err = TransportError::Other {
            message: "boom".to_string(),
        };
        assert!(!err.is_server_error());
    }

    #[tokio::test]
    async fn test_send_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(r#"{"hello":"world"}"#)
            .with_status(200)
            .with_body(r#"{"status_code":200}"#)
            .create_async()
            .await;

        let response = transport().send(&request(server.url())).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"status_code":200}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_maps_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let err = transport().send(&request(server.url())).await.unwrap_err();

        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_connection_failure() {
        // Nothing listens on port 9 (discard) in the test environment
        let err = transport()
            .send(&request("http://127.0.0.1:9/".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Request { .. }));
        assert!(!err.is_server_error());
    }
}
