//! Domain logic for client-side operations.
//!
//! Pure functions only, so the decisions can be tested without a server.

use reqwest::Url;

use crate::error::ClientError;

/// Control token reporting that the viewer is looking at the stream.
pub const VISIBLE_TOKEN: &str = "visible";
/// Control token reporting that the viewer looked away.
pub const HIDDEN_TOKEN: &str = "hidden";

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// `/hide`: report the viewer as away
    Hide,
    /// `/show`: report the viewer as back
    Show,
    /// `/quit`: close the connection and exit
    Quit,
    /// Anything else
    Unknown(String),
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/hide" => Self::Hide,
            "/show" => Self::Show,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Text frame to send for this command, if any.
    pub fn control_token(&self) -> Option<&'static str> {
        match self {
            Self::Hide => Some(HIDDEN_TOKEN),
            Self::Show => Some(VISIBLE_TOKEN),
            Self::Quit | Self::Unknown(_) => None,
        }
    }
}

/// Build the `/events` URL with the display name as a query parameter.
pub fn build_events_url(base: &str, name: Option<&str>) -> Result<Url, ClientError> {
    let mut url = Url::parse(base).map_err(|_| ClientError::InvalidUrl(base.to_string()))?;
    if let Some(name) = name.map(str::trim).filter(|name| !name.is_empty()) {
        url.query_pairs_mut().append_pair("name", name);
    }
    Ok(url)
}

/// Check if the client should exit immediately based on the error type.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::InvalidUrl(_))
}

/// Check if the client should attempt to reconnect.
///
/// `current_attempt` is the number of failed sessions so far.
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}

/// Failed attempts in the current outage after `error` ended a session.
///
/// A session that was established before it failed starts a new outage.
pub fn failed_attempts_after(error: &ClientError, previous: u32) -> u32 {
    match error {
        ClientError::ConnectionLost(_) => 1,
        _ => previous + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_visibility_commands() {
        // テスト項目: /hide と /show が対応する制御トークンに変換される
        // given (前提条件):
        let hide = InputCommand::parse("/hide");
        let show = InputCommand::parse("  /show ");

        // when (操作):
        let hide_token = hide.control_token();
        let show_token = show.control_token();

        // then (期待する結果):
        assert_eq!(hide_token, Some("hidden"));
        assert_eq!(show_token, Some("visible"));
    }

    #[test]
    fn test_parse_quit_and_unknown_commands() {
        // テスト項目: /quit と未知の入力は制御トークンを持たない
        // given (前提条件):
        let quit = InputCommand::parse("/quit");
        let unknown = InputCommand::parse("hello");

        // when (操作):
        let tokens = (quit.control_token(), unknown.control_token());

        // then (期待する結果):
        assert_eq!(quit, InputCommand::Quit);
        assert_eq!(unknown, InputCommand::Unknown("hello".to_string()));
        assert_eq!(tokens, (None, None));
    }

    #[test]
    fn test_build_events_url_encodes_name() {
        // テスト項目: 表示名がクエリパラメータとしてエンコードされる
        // given (前提条件):
        let base = "ws://127.0.0.1:8080/events";

        // when (操作):
        let url = build_events_url(base, Some("alice & bob")).unwrap();

        // then (期待する結果):
        assert_eq!(url.as_str(), "ws://127.0.0.1:8080/events?name=alice+%26+bob");
    }

    #[test]
    fn test_build_events_url_without_name() {
        // テスト項目: 表示名が空の場合はクエリパラメータを付けない
        // given (前提条件):
        let base = "ws://127.0.0.1:8080/events";

        // when (操作):
        let url = build_events_url(base, Some("  ")).unwrap();

        // then (期待する結果):
        assert_eq!(url.as_str(), base);
    }

    #[test]
    fn test_build_events_url_rejects_garbage() {
        // テスト項目: 解析できない URL は InvalidUrl になり、再接続されない
        // given (前提条件):
        let base = "not a url";

        // when (操作):
        let error = build_events_url(base, None).unwrap_err();

        // then (期待する結果):
        assert!(matches!(error, ClientError::InvalidUrl(_)));
        assert!(should_exit_immediately(&error));
        assert!(!should_attempt_reconnect(&error, 0, 5));
    }

    #[test]
    fn test_established_session_restarts_attempt_count() {
        // テスト項目: 接続確立後に切断された場合、再接続回数が最初から数え直される
        // given (前提条件): 直前の障害で 4 回失敗した後に接続でき、その後切断された
        let error = ClientError::ConnectionLost("server went away".to_string());

        // when (操作):
        let attempts = failed_attempts_after(&error, 4);

        // then (期待する結果):
        assert_eq!(attempts, 1);
        assert!(should_attempt_reconnect(&error, attempts, 5));
    }

    #[test]
    fn test_failed_connect_counts_towards_limit() {
        // テスト項目: 接続できなかった場合は同じ障害の失敗回数として加算される
        // given (前提条件):
        let error = ClientError::ConnectionError("connection refused".to_string());

        // when (操作):
        let attempts = failed_attempts_after(&error, 4);

        // then (期待する結果):
        assert_eq!(attempts, 5);
        assert!(!should_attempt_reconnect(&error, attempts, 5));
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 再接続回数が上限未満の場合、再接続すべきと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 4, 5);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(!result);
    }
}
