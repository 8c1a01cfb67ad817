//! Rendering of received frames for the terminal.
//!
//! The server speaks htmx: every payload is an HTML fragment, and several
//! payloads may arrive in one frame separated by newlines.

use hookcast_shared::time::format_local_clock;

const RULE: &str = "============================================================";
const MESSAGE_OPENING: &str = "<ul hx-swap-oob=";
const ROSTER_OPENING: &str = "<div id=\"users\">";

/// One payload pulled out of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The presence roster (`<div id="users">`)
    Roster {
        summary: String,
        members: Vec<RosterLine>,
    },
    /// A webhook message (`<li class="message">`)
    Message(String),
    /// Anything this viewer does not recognise
    Raw(String),
}

/// One member of a rendered roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterLine {
    pub label: String,
    pub is_me: bool,
}

/// Split a frame into its payloads.
///
/// Payloads are joined with `\n`, but a webhook body may contain newlines of
/// its own. A new payload therefore only starts at a known fragment opening;
/// other lines belong to the open fragment until its closing tag. Empty lines
/// outside a fragment are skipped.
pub fn split_frame(frame: &str) -> Vec<String> {
    let mut payloads: Vec<String> = Vec::new();
    let mut closing: Option<&'static str> = None;

    for line in frame.split('\n') {
        if let Some(tag) = closing_tag(line) {
            payloads.push(line.to_string());
            closing = Some(tag);
        } else if let Some(current) = payloads.last_mut().filter(|_| closing.is_some()) {
            current.push('\n');
            current.push_str(line);
        } else if !line.trim().is_empty() {
            payloads.push(line.to_string());
        }

        if closing.is_some_and(|tag| line.trim_end().ends_with(tag)) {
            closing = None;
        }
    }
    payloads
}

/// Closing tag of the fragment `line` opens, if it opens one.
fn closing_tag(line: &str) -> Option<&'static str> {
    let line = line.trim_start();
    if line.starts_with(MESSAGE_OPENING) {
        Some("</ul>")
    } else if line.starts_with(ROSTER_OPENING) {
        Some("</div>")
    } else {
        None
    }
}

/// Classify a single payload.
pub fn parse_payload(payload: &str) -> Payload {
    let trimmed = payload.trim();

    if trimmed.starts_with(ROSTER_OPENING) {
        let summary = element_text(trimmed, "<p>", "</p>").unwrap_or_default();
        let members = list_items(trimmed)
            .into_iter()
            .map(|(attrs, label)| RosterLine {
                label,
                is_me: attrs.contains("class=\"self\""),
            })
            .collect();
        return Payload::Roster { summary, members };
    }

    if trimmed.contains("class=\"message\"") {
        let body = list_items(trimmed)
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join(" ");
        return Payload::Message(body);
    }

    Payload::Raw(trimmed.to_string())
}

/// Frame formatter for client display
pub struct FrameFormatter;

impl FrameFormatter {
    /// Render every payload in `frame`, stamped with `received_at`.
    pub fn format_frame(frame: &str, received_at: i64) -> String {
        split_frame(frame)
            .iter()
            .map(|payload| Self::format_payload(&parse_payload(payload), received_at))
            .collect()
    }

    pub fn format_payload(payload: &Payload, received_at: i64) -> String {
        match payload {
            Payload::Roster { summary, members } => Self::format_roster(summary, members),
            Payload::Message(body) => Self::format_message(body, received_at),
            Payload::Raw(text) => format!("\n← Received: {}\n", text),
        }
    }

    fn format_roster(summary: &str, members: &[RosterLine]) -> String {
        let mut output = format!("\n{RULE}\n{summary}\n");
        for member in members {
            let me_suffix = if member.is_me { " (me)" } else { "" };
            output.push_str(&format!("  {}{}\n", member.label, me_suffix));
        }
        output.push_str(RULE);
        output.push('\n');
        output
    }

    fn format_message(body: &str, received_at: i64) -> String {
        format!("\n[{}] {}\n", format_local_clock(received_at), body)
    }

    /// Format a binary frame notification
    pub fn format_binary(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }
}

/// `(attributes, text)` of every `<li>` in `html`.
fn list_items(html: &str) -> Vec<(String, String)> {
    html.split("<li")
        .skip(1)
        .filter_map(|chunk| {
            let (attrs, rest) = chunk.split_once('>')?;
            let (inner, _) = rest.split_once("</li>")?;
            Some((attrs.to_string(), unescape_html(&strip_tags(inner))))
        })
        .collect()
}

fn element_text(html: &str, open: &str, close: &str) -> Option<String> {
    let (_, rest) = html.split_once(open)?;
    let (inner, _) = rest.split_once(close)?;
    Some(unescape_html(&strip_tags(inner)))
}

fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
