//! UseCase: webhook payload publication
//!
//! Wraps the webhook body for the htmx page, fans it out through the hub and
//! remembers it for the home page.

use std::sync::Arc;

use bytes::Bytes;
use hookcast_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    domain::{Broadcaster, HistoryEntry, MessageHistory},
    infrastructure::render_webhook_fragment,
};

use super::error::PublishError;

/// Webhook publication use case
pub struct PublishWebhookUseCase {
    /// Fan-out ingress (the hub in production)
    broadcaster: Arc<dyn Broadcaster>,
    /// Recently published messages, oldest first
    history: Mutex<MessageHistory>,
    clock: Arc<dyn Clock>,
}

impl PublishWebhookUseCase {
    pub fn new(
        broadcaster: Arc<dyn Broadcaster>,
        history: MessageHistory,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            broadcaster,
            history: Mutex::new(history),
            clock,
        }
    }

    /// Publish a webhook body.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. The message is only
    /// recorded in the history once the hub accepted it.
    pub async fn execute(&self, body: Bytes) -> Result<(), PublishError> {
        let body = String::from_utf8_lossy(&body);
        tracing::info!("Received webhook: {}", body);

        let fragment = render_webhook_fragment(&body);
        self.broadcaster.broadcast(Bytes::from(fragment))?;

        let received_at = self.clock.now_millis();
        let mut history = self.history.lock().await;
        history.push(HistoryEntry {
            body: body.trim().to_string(),
            received_at,
        });
        tracing::debug!("Now have {} past message(s)", history.len());

        Ok(())
    }

    /// Recently published messages, oldest first.
    pub async fn recent_messages(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.entries().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HubError, MockBroadcaster};
    use hookcast_shared::time::FixedClock;
    use mockall::predicate::eq;

    fn create_usecase(broadcaster: MockBroadcaster, capacity: usize) -> PublishWebhookUseCase {
        PublishWebhookUseCase::new(
            Arc::new(broadcaster),
            MessageHistory::new(capacity),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        )
    }

    #[tokio::test]
    async fn test_publish_broadcasts_wrapped_body() {
        // テスト項目: Webhook の本文が htmx 用に包まれてブロードキャストされる
        // given (前提条件):
        let mut broadcaster = MockBroadcaster::new();
        broadcaster
            .expect_broadcast()
            .with(eq(Bytes::from_static(
                b"<ul hx-swap-oob=\"afterbegin:#messages\"><li class=\"message\">build #42 passed</li></ul>",
            )))
            .times(1)
            .returning(|_| Ok(()));
        let usecase = create_usecase(broadcaster, 10);

        // when (操作):
        let result = usecase.execute(Bytes::from_static(b"build #42 passed\n")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        let history = usecase.recent_messages().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].body, "build #42 passed");
        assert_eq!(history[0].received_at, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_publish_keeps_only_recent_messages() {
        // テスト項目: 履歴には最新の N 件のみが残る
        // given (前提条件):
        let mut broadcaster = MockBroadcaster::new();
        broadcaster.expect_broadcast().times(3).returning(|_| Ok(()));
        let usecase = create_usecase(broadcaster, 2);

        // when (操作):
        for body in ["one", "two", "three"] {
            usecase.execute(Bytes::from(body)).await.unwrap();
        }

        // then (期待する結果):
        let bodies: Vec<String> = usecase
            .recent_messages()
            .await
            .into_iter()
            .map(|entry| entry.body)
            .collect();
        assert_eq!(bodies, vec!["two", "three"]);
    }

    #[tokio::test]
    async fn test_publish_fails_when_hub_stopped() {
        // テスト項目: ハブ停止中はエラーを返し、履歴にも追加されない
        // given (前提条件):
        let mut broadcaster = MockBroadcaster::new();
        broadcaster
            .expect_broadcast()
            .times(1)
            .returning(|_| Err(HubError::Stopped));
        let usecase = create_usecase(broadcaster, 10);

        // when (操作):
        let result = usecase.execute(Bytes::from_static(b"lost")).await;

        // then (期待する結果):
        assert_eq!(result, Err(PublishError::Unavailable(HubError::Stopped)));
        assert!(usecase.recent_messages().await.is_empty());
    }
}
