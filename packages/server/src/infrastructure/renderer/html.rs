//! HTML renderer for pages and HTMX fragments.
//!
//! Fragments pushed over the WebSocket carry `hx-swap-oob` markers so the HTMX
//! `ws` extension swaps them into the chat shell by element id:
//! `#messagesContainer` receives messages and notices, `#userCount` is replaced
//! by presence counts.

use chrono::FixedOffset;
use hiroba_shared::time::{timestamp_to_clock_time, timestamp_to_clock_time_in};

use crate::domain::{
    Category, DisplayName, MAX_DISPLAY_NAME_CHARS, MessageBody, RenderError, Timestamp, View,
    ViewRenderer,
};

const HTMX_SCRIPT: &str = "https://unpkg.com/htmx.org@2.0.4";
const HTMX_WS_SCRIPT: &str = "https://unpkg.com/htmx-ext-ws@2.0.2/ws.js";
/// Auto-scroll and mobile viewport sizing, served from the static directory.
const APP_SCRIPT: &str = "/static/main.js";

/// Escape text for inclusion in HTML content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// `"1 user online"`, `"N users online"`.
pub fn presence_count_text(count: usize) -> String {
    if count == 1 {
        "1 user online".to_string()
    } else {
        format!("{} users online", count)
    }
}

/// Renders [`View`]s as HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    /// Offset used for `HH:MM` times; the server's local zone when `None`.
    offset: Option<FixedOffset>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render times in a fixed offset instead of the local zone.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    fn clock_time(&self, at: Timestamp) -> String {
        match &self.offset {
            Some(offset) => timestamp_to_clock_time_in(at.value(), offset),
            None => timestamp_to_clock_time(at.value()),
        }
    }

    fn page(&self, main: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Hiroba</title>
<link rel="stylesheet" href="/static/style.css">
<script src="{HTMX_SCRIPT}"></script>
<script src="{HTMX_WS_SCRIPT}"></script>
<script src="{APP_SCRIPT}" defer></script>
</head>
<body>
{main}
</body>
</html>
"#
        )
    }

    fn login(&self) -> String {
        let options: String = Category::ALL
            .iter()
            .enumerate()
            .map(|(i, category)| {
                format!(
                    r#"<label><input type="radio" name="gender" value="{value}"{checked}> {value}</label>"#,
                    value = category.as_str(),
                    checked = if i == 0 { " checked" } else { "" },
                )
            })
            .collect();
        format!(
            r##"<main id="main" class="login">
<h1>Hiroba</h1>
<form action="/chat" method="get" hx-get="/chat" hx-target="#main" hx-swap="outerHTML" hx-push-url="true">
<label>Name <input name="name" maxlength="{MAX_DISPLAY_NAME_CHARS}" required autofocus></label>
<fieldset><legend>Gender</legend>{options}</fieldset>
<button type="submit">Join</button>
</form>
</main>"##
        )
    }

    fn chat_shell(&self, name: &DisplayName, category: Category) -> String {
        let join_request = serde_json::json!({
            "name": name.as_str(),
            "gender": category.as_str(),
        })
        .to_string();
        format!(
            r#"<main id="main" class="chat" hx-ext="ws" ws-connect="/ws">
<header><h1>Hiroba</h1><span id="userCount" class="user-count">{count}</span></header>
<div ws-send hx-trigger="load" hx-vals='{join}' hidden></div>
<div id="messagesContainer" class="messages"></div>
<form id="chat-form" class="input-container" ws-send hx-on::ws-after-send="this.reset()">
<input type="hidden" name="name" value="{name}">
<input name="message" autocomplete="off" placeholder="Message" required>
<button type="submit">Send</button>
</form>
</main>"#,
            count = presence_count_text(0),
            join = escape_html(&join_request),
            name = escape_html(name.as_str()),
        )
    }

    fn message(
        &self,
        name: &DisplayName,
        category: Category,
        body: &MessageBody,
        posted_at: Timestamp,
        own: bool,
    ) -> String {
        format!(
            r#"<div id="messagesContainer" hx-swap-oob="beforeend"><div class="message {side}"><span class="avatar {category}">{avatar}</span><div class="bubble"><span class="sender">{name}</span><p class="body">{body}</p><time>{time}</time></div></div></div>"#,
            side = if own { "own" } else { "other" },
            category = category.as_str(),
            avatar = escape_html(&name.initial()),
            name = escape_html(name.as_str()),
            body = escape_html(body.as_str()),
            time = self.clock_time(posted_at),
        )
    }

    fn notice(&self, kind: &str, name: &DisplayName, category: Category, at: Timestamp) -> String {
        let verb = if kind == "joined" { "joined" } else { "left" };
        format!(
            r#"<div id="messagesContainer" hx-swap-oob="beforeend"><p class="notice {kind} {category}"><span class="sender">{name}</span> {verb} the chat <time>{time}</time></p></div>"#,
            category = category.as_str(),
            name = escape_html(name.as_str()),
            time = self.clock_time(at),
        )
    }

    fn presence_count(&self, count: usize) -> String {
        format!(
            r#"<span id="userCount" hx-swap-oob="outerHTML" class="user-count">{}</span>"#,
            presence_count_text(count)
        )
    }
}

impl ViewRenderer for HtmlRenderer {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError> {
        let html = match *view {
            View::Login => self.page(&self.login()),
            View::ChatShell {
                name,
                category,
                partial,
            } => {
                let main = self.chat_shell(name, category);
                if partial { main } else { self.page(&main) }
            }
            View::Message {
                name,
                category,
                body,
                posted_at,
                own,
            } => self.message(name, category, body, posted_at, own),
            View::Joined { name, category, at } => self.notice("joined", name, category, at),
            View::Left { name, category, at } => self.notice("left", name, category, at),
            View::PresenceCount(count) => self.presence_count(count),
        };
        Ok(html)
    }
}
