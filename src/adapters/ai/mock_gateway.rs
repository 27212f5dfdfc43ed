//! Mock conversation gateway for testing.
//!
//! Configurable to return scripted replies in order, or to inject errors,
//! without calling a real AI API. Records every transcript it is sent so
//! tests can verify prompt construction.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{ChatMessage, ConversationGateway, GatewayError};

/// One scripted outcome for a `send` call.
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(GatewayError),
}

/// Scripted oracle for tests. Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MockConversationGateway {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockConversationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply to return on the next unscripted call.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Text(reply.into()));
        self
    }

    /// Queues an error to return on the next unscripted call.
    pub fn with_error(self, error: GatewayError) -> Self {
        self.replies.lock().unwrap().push_back(MockReply::Error(error));
        self
    }

    /// All transcripts passed to `send`, in call order.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ConversationGateway for MockConversationGateway {
    async fn send(&self, transcript: &[ChatMessage]) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push(transcript.to_vec());

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(err)) => Err(err),
            None => Err(GatewayError::unavailable("mock gateway script exhausted")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let gateway = MockConversationGateway::new()
            .with_reply("first")
            .with_reply("second");

        assert_eq!(gateway.send(&[]).await.unwrap(), "first");
        assert_eq!(gateway.send(&[]).await.unwrap(), "second");
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn errors_are_injected() {
        let gateway =
            MockConversationGateway::new().with_error(GatewayError::AuthenticationFailed);
        assert_eq!(
            gateway.send(&[]).await.unwrap_err(),
            GatewayError::AuthenticationFailed
        );
    }

    #[tokio::test]
    async fn exhausted_script_is_unavailable() {
        let gateway = MockConversationGateway::new();
        assert!(matches!(
            gateway.send(&[]).await.unwrap_err(),
            GatewayError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn transcripts_are_recorded() {
        let gateway = MockConversationGateway::new().with_reply("ok");
        gateway.send(&[ChatMessage::user("hello")]).await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].content, "hello");
    }
}
