//! UseCase: accepting an upgraded WebSocket connection
//!
//! Creates the [`Client`] for the connection, registers it with the hub and
//! runs its loops until the connection ends.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures_util::{Sink, Stream};

use crate::{
    client::{Client, ConnectionSettings},
    domain::DisplayName,
    hub::Hub,
};

/// Connection acceptance use case
pub struct AcceptConnectionUseCase {
    hub: Hub,
    settings: ConnectionSettings,
}

impl AcceptConnectionUseCase {
    pub fn new(hub: Hub, settings: ConnectionSettings) -> Self {
        Self { hub, settings }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Serve one connection until it is closed and unregistered.
    pub async fn execute<S, R, E>(&self, sink: S, stream: R, name: DisplayName)
    where
        S: Sink<Message> + Send + Unpin + 'static,
        S::Error: Display + Send,
        R: Stream<Item = Result<Message, E>> + Send + Unpin + 'static,
        E: Display + Send + 'static,
    {
        let (client, member) = Client::new(self.hub.clone(), name, self.settings);
        tracing::info!("Client {} ({}) connected", client.id(), client.name());

        self.hub.register(member);
        client.run(sink, stream).await;
    }
}

/// Pick the display name: explicit query parameter, then the User-Agent
/// header, then "anonymous".
pub fn resolve_display_name(requested: Option<&str>, user_agent: Option<&str>) -> DisplayName {
    requested
        .and_then(|name| DisplayName::new(name).ok())
        .or_else(|| user_agent.and_then(|agent| DisplayName::new(agent).ok()))
        .unwrap_or_else(DisplayName::anonymous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Roster, RosterFormatter};
    use bytes::Bytes;
    use std::sync::Arc;

    struct NamesFormatter;

    impl RosterFormatter for NamesFormatter {
        fn format(&self, roster: &Roster) -> Bytes {
            Bytes::from(roster.names().join(","))
        }
    }

    #[test]
    fn test_resolve_display_name_prefers_query() {
        // テスト項目: クエリパラメータの名前が User-Agent より優先される
        // given (前提条件):
        let (requested, agent) = (Some("alice"), Some("Mozilla/5.0"));

        // when (操作):
        let name = resolve_display_name(requested, agent);

        // then (期待する結果):
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_resolve_display_name_falls_back() {
        // テスト項目: 名前が空なら User-Agent、どちらもなければ anonymous になる
        // given (前提条件):
        let blank = Some("   ");

        // when (操作):
        let from_agent = resolve_display_name(blank, Some("curl/8.0"));
        let anonymous = resolve_display_name(None, None);

        // then (期待する結果):
        assert_eq!(from_agent.as_str(), "curl/8.0");
        assert_eq!(anonymous.as_str(), "anonymous");
    }

    #[tokio::test]
    async fn test_execute_registers_until_stream_ends() {
        // テスト項目: 接続中は登録され、ストリーム終了後に登録解除される
        // given (前提条件):
        let (hub, _handle) = Hub::spawn(Arc::new(NamesFormatter));
        let usecase = AcceptConnectionUseCase::new(hub.clone(), ConnectionSettings::default());
        let (in_tx, in_rx) = tokio::sync::mpsc::unbounded_channel::<Result<Message, String>>();
        let stream = Box::pin(futures_util::stream::unfold(in_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        }));
        let sink = Box::pin(futures_util::sink::drain::<Message>());
        let name = DisplayName::new("alice").unwrap();
        let serve = tokio::spawn(async move { usecase.execute(sink, stream, name).await });

        // when (操作):
        let mut connected = Vec::new();
        for _ in 0..100 {
            connected = hub.snapshot().await.unwrap();
            if !connected.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        drop(in_tx);
        serve.await.unwrap();

        // then (期待する結果):
        assert_eq!(connected.len(), 1);
        assert_eq!(connected[0].name.as_str(), "alice");
        assert!(hub.snapshot().await.unwrap().is_empty());
    }
}
