//! HTML fragments swapped into the home page by the htmx WebSocket extension.

use std::fmt::Write;

use bytes::Bytes;
use hookcast_shared::time::timestamp_to_rfc3339;

use crate::domain::{HistoryEntry, Roster, RosterFormatter};

/// Renders the roster as the `#users` element of the home page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmxRosterFormatter;

impl RosterFormatter for HtmxRosterFormatter {
    fn format(&self, roster: &Roster) -> Bytes {
        let mut html = String::with_capacity(64 + roster.len() * 48);
        let noun = if roster.len() == 1 { "user" } else { "users" };
        let _ = write!(
            html,
            "<div id=\"users\"><p>{} {} connected:</p><ul>",
            roster.len(),
            noun
        );
        for entry in roster.entries() {
            let name = escape_html(entry.name.as_str());
            if entry.is_viewer {
                let _ = write!(html, "<li class=\"self\">{name}</li>");
            } else if entry.is_inactive() {
                let _ = write!(html, "<li class=\"inactive\">{name} (away)</li>");
            } else {
                let _ = write!(html, "<li>{name}</li>");
            }
        }
        html.push_str("</ul></div>");
        Bytes::from(html)
    }
}

/// Wrap a webhook body so htmx prepends it to the `#messages` list.
///
/// The body is inserted as-is: webhook senders are trusted to send markup.
pub fn render_webhook_fragment(body: &str) -> String {
    format!(
        "<ul hx-swap-oob=\"afterbegin:#messages\"><li class=\"message\">{}</li></ul>",
        body.trim()
    )
}

/// Escape text for use inside HTML element content or attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the home page.
///
/// `history` is oldest first; the page lists the newest message on top, the
/// same order live messages get via `afterbegin`. Each entry carries its
/// receive time (UTC) as a tooltip.
pub fn render_home_page<'a>(
    websocket_url: &str,
    history: impl DoubleEndedIterator<Item = &'a HistoryEntry>,
) -> String {
    let mut messages = String::new();
    for entry in history.rev() {
        let _ = write!(
            messages,
            "\n    <li class=\"message\" title=\"Received {}\">{}</li>",
            timestamp_to_rfc3339(entry.received_at),
            entry.body.trim()
        );
    }

    HOME_TEMPLATE
        .replace("{{websocket_url}}", &escape_html(websocket_url))
        .replace("{{messages}}", &messages)
}

const HOME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>hookcast</title>
<script src="https://unpkg.com/htmx.org@1.9.3"></script>
<script src="https://unpkg.com/htmx.org/dist/ext/ws.js"></script>
<style>
*, *::before, *::after { box-sizing: border-box; }
* { margin: 0; }
body { font: 12pt SF Mono, monospace; background: #f0f0ff; padding: 20px; }
#status::before {
  content: ""; display: inline-block; width: 25px; height: 19px;
  margin-right: 0.2em; vertical-align: middle;
  background: url(sprite.png) no-repeat left center / 100px 19px;
}
#status[data-status="connected"] { color: #8aa487; }
#status[data-status="connecting"] { color: #c8ad97; }
#status[data-status="error"] { color: #c4796f; }
#status[data-status="disconnected"] { color: #8e8e8e; }
#status[data-status="connected"]::before { background-position: left center; }
#status[data-status="error"]::before { background-position: -25px center; }
#status[data-status="connecting"]::before { background-position: -50px center; }
#status[data-status="disconnected"]::before { background-position: right center; }
#users ul, #messages { padding-left: 20px; }
#users .self { font-weight: bold; }
#users .inactive { color: #8e8e8e; }
</style>
</head>
<body>
<div hx-ext="ws" ws-connect="{{websocket_url}}">
  WebSocket: <span id="status" data-status="connecting">Connecting</span><br><br>
  Clients:
  <div id="users"></div>
  <br>
  Messages:
  <ul id="messages">{{messages}}
  </ul>
</div>
<script>
const status = document.getElementById("status");
let socket = null;
let elt = null;

function setStatus(state, label) {
  status.innerText = label;
  status.setAttribute("data-status", state);
}

document.addEventListener("visibilitychange", () => {
  if (socket) {
    socket.send(document.visibilityState, elt);
  }
});
document.body.addEventListener("htmx:wsOpen", (evt) => {
  socket = evt.detail.socketWrapper;
  elt = evt.detail.elt;
  setStatus("connected", "Connected");
});
document.body.addEventListener("htmx:wsClose", () => {
  socket = null;
  setStatus("disconnected", "Disconnected");
});
document.body.addEventListener("htmx:wsError", () => setStatus("error", "Error"));
document.body.addEventListener("htmx:wsConnecting", () => setStatus("connecting", "Connecting"));
</script>
</body>
</html>
"#;
