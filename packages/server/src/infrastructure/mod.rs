//! Presentation of payloads for the htmx front end.
//!
//! The core never inspects payload bytes; everything HTML-specific lives here.

pub mod html;

pub use html::{HtmxRosterFormatter, escape_html, render_home_page, render_webhook_fragment};
