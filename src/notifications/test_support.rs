//! In-memory transport for unit tests.

use crate::external::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Records every request and answers from a scripted queue
#[derive(Default)]
pub(crate) struct FakeTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
}

impl FakeTransport {
    pub(crate) fn with_responses(responses: Vec<Result<ApiResponse, TransportError>>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Other {
                    message: "no scripted response left".to_string(),
                })
            })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub(crate) fn ok(body: &str) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse {
        status: 200,
        body: body.to_string(),
    })
}
