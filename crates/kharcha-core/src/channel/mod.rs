//! Messaging channel seam.
//!
//! The intake flow is channel-agnostic: an adapter (WhatsApp webhook, local
//! REPL, ...) resolves the sender to a user id, hands the message to the
//! conversation engine, and sends replies through [`ChannelSender`]. The
//! transports themselves live outside this crate.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::BillImage;

/// Inbound media attachment (a receipt photo)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundImage {
    /// Remote URL the channel serves the media from
    pub url: String,
    pub content_type: String,
}

/// Inbound message from a messaging channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Channel address of the sender (e.g. phone number)
    pub sender_address: String,
    pub text: Option<String>,
    pub image: Option<InboundImage>,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

impl InboundMessage {
    pub fn text(sender_address: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_address: sender_address.into(),
            text: Some(text.into()),
            image: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_image(mut self, url: impl Into<String>, content_type: impl Into<String>) -> Self {
        self.image = Some(InboundImage {
            url: url.into(),
            content_type: content_type.into(),
        });
        self
    }
}

/// Outbound reply sender for a messaging channel
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Send a text message to a channel address.
    async fn send(&self, to: &str, text: &str) -> Result<()>;
}

/// Image storage collaborator.
///
/// Given the channel's remote media URL, stores the image durably and
/// returns the `{url, storage_id}` pair recorded on the session.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, remote_url: &str) -> Result<BillImage>;
}

/// Test/mock channel sender for unit testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;

    /// Records every outbound message instead of sending it
    #[derive(Default)]
    pub struct MockSender {
        sent: Arc<tokio::sync::Mutex<Vec<(String, String)>>>,
    }

    impl MockSender {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn sent_messages(&self) -> Vec<(String, String)> {
            self.sent.lock().await.clone()
        }

        pub async fn last_message(&self) -> Option<String> {
            self.sent.lock().await.last().map(|(_, text)| text.clone())
        }
    }

    #[async_trait]
    impl ChannelSender for MockSender {
        async fn send(&self, to: &str, text: &str) -> Result<()> {
            self.sent
                .lock()
                .await
                .push((to.to_string(), text.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockSender;
    use super::*;

    #[tokio::test]
    async fn test_mock_sender_records_messages() {
        let sender = MockSender::new();
        sender.send("+919000000001", "hello").await.unwrap();

        let sent = sender.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+919000000001");
        assert_eq!(sender.last_message().await.as_deref(), Some("hello"));
    }

    #[test]
    fn test_inbound_message_builders() {
        let msg = InboundMessage::text("+919000000001", "add")
            .with_image("https://media.example/1.jpg", "image/jpeg");
        assert_eq!(msg.text.as_deref(), Some("add"));
        assert!(msg.image.is_some());
    }
}
