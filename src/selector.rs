//! Choosing which body representation extraction works on

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::email::EmailData;

static QUOTE_MARKERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:>\s*)+").unwrap());

/// Which body a parser wants to read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentPreference {
    /// HTML when it has content, plain text otherwise
    #[default]
    HtmlFirst,
    /// Plain text when it has content, HTML otherwise
    TextFirst,
    TextOnly,
    HtmlOnly,
}

impl ContentPreference {
    const fn order(self) -> &'static [ContentSource] {
        match self {
            Self::HtmlFirst => &[ContentSource::Html, ContentSource::Text],
            Self::TextFirst => &[ContentSource::Text, ContentSource::Html],
            Self::TextOnly => &[ContentSource::Text],
            Self::HtmlOnly => &[ContentSource::Html],
        }
    }
}

/// The MIME part a selected body came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentSource {
    Text,
    Html,
}

/// Cleaned body text ready for line scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedContent {
    pub source: ContentSource,
    pub text: String,
}

/// Pick the body to extract from.
///
/// Returns `None` when no acceptable part has content, which is a normal
/// no-joke outcome rather than an error. HTML is flattened to text, and the
/// result always goes through [`cleanup_body`].
#[must_use]
pub fn select_content(email: &EmailData, preference: ContentPreference) -> Option<SelectedContent> {
    preference.order().iter().find_map(|&source| {
        let raw = match source {
            ContentSource::Text => &email.text,
            ContentSource::Html => &email.html,
        };
        if raw.trim().is_empty() {
            return None;
        }
        let text = match source {
            ContentSource::Text => cleanup_body(raw),
            ContentSource::Html => cleanup_body(&html_to_text(raw)),
        };
        (!text.is_empty()).then_some(SelectedContent { source, text })
    })
}

/// Normalise a body for line-based parsing: trim every line, strip quote
/// markers, squeeze blank runs to one line and drop blank edges.
#[must_use]
pub fn cleanup_body(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = QUOTE_MARKERS.replace(line.trim(), "").trim().to_string();
        if line.is_empty() && lines.last().is_none_or(String::is_empty) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

/// Flatten HTML into plain text.
///
/// Whitespace in text is collapsed the way a browser renders it, except
/// inside `pre`. Tags and comments are dropped along with `script` and
/// `style` content, block-closing tags become line breaks and the common
/// entities are decoded.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    let mut skipping: Option<&str> = None;
    let mut preformatted = false;

    while let Some(open) = rest.find('<') {
        if skipping.is_none() {
            push_text(&mut out, &rest[..open], preformatted);
        }
        let after = &rest[open + 1..];
        if let Some(comment) = after.strip_prefix("!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }
        let Some(close) = after.find('>') else {
            rest = "";
            break;
        };
        let tag = after[..close].trim().to_ascii_lowercase();
        rest = &after[close + 1..];

        let closing = tag.starts_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default()
            .to_string();

        if let Some(waiting_for) = skipping {
            if closing && name == waiting_for {
                skipping = None;
            }
            continue;
        }

        match (closing, name.as_str()) {
            (false, "script") => skipping = Some("script"),
            (false, "style") => skipping = Some("style"),
            (false, "pre") => {
                out.push('\n');
                preformatted = true;
            }
            (true, "pre") => {
                out.push_str("\n\n");
                preformatted = false;
            }
            (_, "br") => out.push('\n'),
            (true, "p" | "div" | "tr" | "table") => out.push_str("\n\n"),
            (true, "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6") => out.push('\n'),
            _ => {}
        }
    }
    if skipping.is_none() {
        push_text(&mut out, rest, preformatted);
    }

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Append a text node, squeezing each whitespace run to one space
fn push_text(out: &mut String, text: &str, preformatted: bool) {
    if preformatted {
        out.push_str(text);
        return;
    }
    for c in text.chars() {
        if !c.is_whitespace() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
    }
}
