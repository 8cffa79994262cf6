//! Scoped batching of messages into one createMessage call.
//!
//! A `PendingMessage` collects messages for one client and delivers them
//! with a single request when it is flushed. Flushing consumes the batch,
//! so nothing can be queued afterwards, and an empty batch never touches
//! the network.

use super::message::PushwooshMessage;
use super::pushwoosh::Pushwoosh;
use crate::error::PushwooshResult;
use std::mem;

/// Messages waiting to be created through one [`Pushwoosh`] client
///
/// # Example
/// ```ignore
/// let sent = pushwoosh
///     .pending()
///     .queue(PushwooshMessage::new("first"))
///     .queue(PushwooshMessage::new("second"))
///     .flush()
///     .await?;
///
/// for (message, code) in sent.iter() {
///     tracing::info!(sent = message.was_sent(), code, "delivered");
/// }
/// ```
#[must_use = "queued messages are only delivered by `flush`"]
pub struct PendingMessage<'a> {
    pushwoosh: &'a Pushwoosh,
    messages: Vec<PushwooshMessage>,
}

impl<'a> PendingMessage<'a> {
    pub fn new(pushwoosh: &'a Pushwoosh) -> Self {
        Self {
            pushwoosh,
            messages: Vec::new(),
        }
    }

    /// Appends `message` and hands the batch back for chaining
    pub fn queue(mut self, message: PushwooshMessage) -> Self {
        self.push(message);
        self
    }

    /// Appends `message` in place
    pub fn push(&mut self, message: PushwooshMessage) -> &mut Self {
        self.messages.push(message);
        self
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Queued messages in delivery order
    pub fn messages(&self) -> &[PushwooshMessage] {
        &self.messages
    }

    /// Delivers every queued message with one request
    ///
    /// An empty batch returns immediately without a request. Errors from the
    /// client are returned unchanged and no message is marked as sent.
    pub async fn flush(mut self) -> PushwooshResult<SentMessages> {
        let mut messages = mem::take(&mut self.messages);

        if messages.is_empty() {
            tracing::debug!("Pending message is empty, nothing to send");
            return Ok(SentMessages::default());
        }

        let identifiers = self.pushwoosh.create_message(&mut messages).await?;

        Ok(SentMessages {
            messages,
            identifiers,
        })
    }
}

impl Drop for PendingMessage<'_> {
    fn drop(&mut self) {
        if !self.messages.is_empty() {
            tracing::warn!(
                application = %self.pushwoosh.application_code(),
                count = self.messages.len(),
                "Pending message dropped without flush; queued messages were not sent"
            );
        }
    }
}

/// Outcome of a flushed batch
///
/// Holds the delivered messages (all marked as sent) and the message codes
/// Pushwoosh returned, aligned by position. Pushwoosh may return fewer codes
/// than messages.
#[derive(Debug, Default)]
pub struct SentMessages {
    messages: Vec<PushwooshMessage>,
    identifiers: Vec<Option<String>>,
}

impl SentMessages {
    pub fn messages(&self) -> &[PushwooshMessage] {
        &self.messages
    }

    /// Message codes as returned by the API
    pub fn identifiers(&self) -> &[Option<String>] {
        &self.identifiers
    }

    /// Message code assigned to the message queued at `index`
    pub fn identifier(&self, index: usize) -> Option<&str> {
        self.identifiers.get(index).and_then(|code| code.as_deref())
    }

    /// Each message paired with its code, in queue order
    pub fn iter(&self) -> impl Iterator<Item = (&PushwooshMessage, Option<&str>)> {
        self.messages
            .iter()
            .enumerate()
            .map(move |(index, message)| (message, self.identifier(index)))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_parts(self) -> (Vec<PushwooshMessage>, Vec<Option<String>>) {
        (self.messages, self.identifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PushwooshError;
    use crate::notifications::test_support::{FakeTransport, ok};
    use std::sync::Arc;

    fn client(transport: &Arc<FakeTransport>) -> Pushwoosh {
        Pushwoosh::new(transport.clone(), "APP-CODE", "token")
    }

    #[tokio::test]
    async fn test_dispatch_upon_flush() {
        let transport = Arc::new(FakeTransport::with_responses(vec![ok(
            r#"{"status_code":200,"response":{}}"#,
        )]));
        let pushwoosh = client(&transport);

        let sent = PendingMessage::new(&pushwoosh)
            .queue(PushwooshMessage::new("foo"))
            .flush()
            .await
            .unwrap();

        assert_eq!(transport.requests().len(), 1);
        assert_eq!(sent.len(), 1);
        assert!(sent.messages()[0].was_sent());
        assert!(sent.identifiers().is_empty());
        assert_eq!(sent.identifier(0), None);
    }

    #[tokio::test]
    async fn test_no_dispatch_if_queue_is_empty() {
        let transport = Arc::new(FakeTransport::default());
        let pushwoosh = client(&transport);

        let sent = PendingMessage::new(&pushwoosh).flush().await.unwrap();

        assert!(sent.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_batch_sends_nothing() {
        let transport = Arc::new(FakeTransport::default());
        let pushwoosh = client(&transport);

        {
            let pending = pushwoosh.send(PushwooshMessage::new("lost"));
            assert_eq!(pending.len(), 1);
        }

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_single_request_carries_all_messages() {
        let transport = Arc::new(FakeTransport::with_responses(vec![ok(
            r#"{"status_code":200,"response":{"Messages":["CODE_NOT_AVAILABLE","abc123"]}}"#,
        )]));
        let pushwoosh = client(&transport);

        let mut pending = pushwoosh.send(PushwooshMessage::new("first"));
        pending.push(PushwooshMessage::new("second"));
        pending.push(PushwooshMessage::new("third"));
        assert_eq!(pending.messages()[1], PushwooshMessage::new("second"));

        let sent = pending.flush().await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        let contents: Vec<&str> = body["request"]["notifications"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);

        assert_eq!(
            sent.identifiers(),
            &[None, Some("abc123".to_string())][..]
        );
        let paired: Vec<(bool, Option<&str>)> = sent
            .iter()
            .map(|(message, code)| (message.was_sent(), code))
            .collect();
        assert_eq!(
            paired,
            vec![(true, None), (true, Some("abc123")), (true, None)]
        );
    }

    #[tokio::test]
    async fn test_flush_propagates_api_error() {
        let transport = Arc::new(FakeTransport::with_responses(vec![ok(
            r#"{"status_code":400,"status_message":"Bad request"}"#,
        )]));
        let pushwoosh = client(&transport);

        let err = pushwoosh
            .send(PushwooshMessage::new("foo"))
            .flush()
            .await
            .unwrap_err();

        assert!(matches!(err, PushwooshError::Api { status_code: 400, .. }));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_helper() {
        let transport = Arc::new(FakeTransport::with_responses(vec![ok(
            r#"{"status_code":200,"response":{"Messages":["a","b"]}}"#,
        )]));
        let pushwoosh = client(&transport);

        let sent = pushwoosh
            .dispatch(vec![PushwooshMessage::new("1"), PushwooshMessage::new("2")])
            .await
            .unwrap();

        assert_eq!(sent.identifier(0), Some("a"));
        assert_eq!(sent.identifier(1), Some("b"));
        let (messages, identifiers) = sent.into_parts();
        assert_eq!(messages.len(), 2);
        assert_eq!(identifiers.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_nothing() {
        let transport = Arc::new(FakeTransport::default());
        let pushwoosh = client(&transport);

        let sent = pushwoosh.dispatch(Vec::<PushwooshMessage>::new()).await.unwrap();

        assert!(sent.is_empty());
        assert!(transport.requests().is_empty());
    }
}
