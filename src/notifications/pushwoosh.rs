//! Pushwoosh API client.

use super::message::PushwooshMessage;
use super::pending_message::{PendingMessage, SentMessages};
use super::types::{CODE_NOT_AVAILABLE, CreateMessageBody, CreateMessageRequest, CreateMessageResponse};
use crate::config::PushwooshSettings;
use crate::error::{PushwooshError, PushwooshResult};
use crate::external::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default createMessage endpoint
pub const DEFAULT_ENDPOINT: &str = "https://cp.pushwoosh.com/json/1.3/createMessage";

/// Client for the Pushwoosh createMessage API
///
/// Holds the application code, API token and transport. It keeps no batch
/// state; batches live in [`PendingMessage`], so one client can be shared
/// by any number of them.
///
/// # Example
/// ```ignore
/// let pushwoosh = Pushwoosh::from_settings(&settings.pushwoosh)?;
///
/// let mut message = PushwooshMessage::new("Your order has shipped");
/// message.url("https://example.com/orders/42").throttle(500);
///
/// let sent = pushwoosh.send(message).flush().await?;
/// ```
#[derive(Clone)]
pub struct Pushwoosh {
    application: String,
    token: String,
    endpoint: String,
    transport: Arc<dyn Transport>,
}

impl Pushwoosh {
    /// Creates a client that sends through `transport`
    pub fn new(
        transport: Arc<dyn Transport>,
        application: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            token: token.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transport,
        }
    }

    /// Creates a client with the default reqwest transport from settings
    ///
    /// Settings are validated first, so a missing token or a malformed
    /// endpoint is reported here rather than on the first request.
    pub fn from_settings(settings: &PushwooshSettings) -> PushwooshResult<Self> {
        settings
            .validate()
            .map_err(|e| PushwooshError::Configuration {
                key: e.key().to_string(),
                source: e.into(),
            })?;

        let transport = ReqwestTransport::with_timeouts(
            Duration::from_secs(settings.request_timeout),
            Duration::from_secs(settings.connect_timeout),
        )
        .map_err(|e| PushwooshError::Configuration {
            key: "pushwoosh".to_string(),
            source: e.into(),
        })?;

        Ok(Self::new(
            Arc::new(transport),
            settings.application.clone(),
            settings.token.clone(),
        )
        .with_endpoint(settings.endpoint.clone()))
    }

    /// Replaces the transport, keeping credentials and endpoint
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Overrides the createMessage endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn api_token(&self) -> &str {
        &self.token
    }

    pub fn application_code(&self) -> &str {
        &self.application
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Starts an empty batch bound to this client
    pub fn pending(&self) -> PendingMessage<'_> {
        PendingMessage::new(self)
    }

    /// Starts a batch holding `message`
    ///
    /// More messages can be queued on the returned batch before it is
    /// flushed.
    pub fn send(&self, message: PushwooshMessage) -> PendingMessage<'_> {
        self.pending().queue(message)
    }

    /// Queues all `messages` in one batch and flushes it
    pub async fn dispatch<I>(&self, messages: I) -> PushwooshResult<SentMessages>
    where
        I: IntoIterator<Item = PushwooshMessage>,
    {
        let mut pending = self.pending();
        for message in messages {
            pending.push(message);
        }
        pending.flush().await
    }

    /// Creates `messages` in the Pushwoosh API with a single request
    ///
    /// A transport failure classified as a transient server error is retried
    /// once. Messages are marked as sent only after the response has been
    /// validated, so no message is marked on any error path.
    ///
    /// # Returns
    /// Message codes in queue order. Codes Pushwoosh did not assign are
    /// `None`, and the list may be shorter than `messages`.
    pub async fn create_message(
        &self,
        messages: &mut [PushwooshMessage],
    ) -> PushwooshResult<Vec<Option<String>>> {
        let start = Instant::now();
        let request = self.build_request(messages)?;

        tracing::debug!(
            application = %self.application,
            transport = self.transport.name(),
            count = messages.len(),
            "Sending createMessage request"
        );

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(e) => self.try_again_if_transient(&request, e).await?,
        };

        let identifiers = Self::parse_response(&response)?;

        for message in messages.iter_mut() {
            message.mark_sent();
        }

        tracing::info!(
            application = %self.application,
            count = messages.len(),
            codes = identifiers.iter().filter(|code| code.is_some()).count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Pushwoosh messages created"
        );

        Ok(identifiers)
    }

    fn build_request(&self, messages: &[PushwooshMessage]) -> PushwooshResult<ApiRequest> {
        let envelope = CreateMessageRequest {
            request: CreateMessageBody {
                application: &self.application,
                auth: &self.token,
                notifications: messages,
            },
        };
        let body =
            serde_json::to_string(&envelope).map_err(|source| PushwooshError::Encode { source })?;

        Ok(ApiRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }

    /// Retries once for transient server errors
    ///
    /// The final error always wraps the original failure; a failed retry's
    /// own error is only logged.
    async fn try_again_if_transient(
        &self,
        request: &ApiRequest,
        error: TransportError,
    ) -> PushwooshResult<ApiResponse> {
        if self.transport.is_transient_server_error(&error) {
            tracing::warn!(
                application = %self.application,
                error = %error,
                "Transient Pushwoosh server error, retrying once"
            );

            match self.transport.send(request).await {
                Ok(response) => return Ok(response),
                Err(retry_error) => {
                    tracing::debug!(error = %retry_error, "Retry of createMessage failed");
                }
            }
        }

        tracing::error!(
            application = %self.application,
            error = %error,
            "Failed to create Pushwoosh message(s)"
        );

        Err(PushwooshError::Communication { source: error })
    }

    fn parse_response(response: &ApiResponse) -> PushwooshResult<Vec<Option<String>>> {
        let parsed: CreateMessageResponse = serde_json::from_str(&response.body)
            .map_err(|source| PushwooshError::Decode { source })?;

        if let Some(status_code) = parsed.status_code {
            if status_code != 200 {
                return Err(PushwooshError::Api {
                    status_code,
                    message: parsed.status_message.unwrap_or_default(),
                });
            }
        }

        let result = parsed
            .result()
            .map_err(|source| PushwooshError::Decode { source })?;

        if let Some(unknown) = result.unknown_devices {
            let devices = unknown.into_devices();
            if !devices.is_empty() {
                tracing::warn!(count = devices.len(), "Pushwoosh reported unknown devices");
                return Err(PushwooshError::UnknownDevices { devices });
            }
        }

        Ok(result
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|code| (code != CODE_NOT_AVAILABLE).then_some(code))
            .collect())
    }
}

impl fmt::Debug for Pushwoosh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pushwoosh")
            .field("application", &self.application)
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport.name())
            .finish()
    }
}
