//! Email model: the parsed input message and the joke records produced from it

use std::path::Path;
use std::sync::LazyLock;

use mailparse::{MailHeader, ParsedMail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ParseError, Result};

static REPLY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:re|fwd?)\s*:\s*").unwrap());

/// A parsed email, reduced to what joke extraction needs.
///
/// Consumers only ever see `&EmailData`; nothing downstream of
/// [`parse_email`] mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailData {
    /// `Subject:` value with encoded-words decoded, empty if absent
    pub subject_header: String,

    /// `From:` value exactly as written (unfolded), empty if absent
    pub from_header: String,

    /// First `text/plain` part, empty if none
    pub text: String,

    /// First `text/html` part, empty if none
    pub html: String,

    /// MIME types of non-text leaf parts, in walk order
    pub attachments: Vec<String>,
}

impl EmailData {
    /// Subject with any leading `Re:`, `Fw:` and `Fwd:` prefixes removed
    #[must_use]
    pub fn clean_subject(&self) -> String {
        let mut subject = self.subject_header.trim();
        while let Some(found) = REPLY_PREFIX.find(subject) {
            subject = subject[found.end()..].trim_start();
        }
        subject.to_string()
    }

    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// One extracted joke.
///
/// The text is always trimmed and never empty; [`JokeData::new`] refuses to
/// build a record otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeData {
    text: String,
    submitter: String,
    title: String,
}

impl JokeData {
    /// Build a joke record, or `None` when the text is blank
    #[must_use]
    pub fn new(text: &str, submitter: impl Into<String>, title: impl Into<String>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            submitter: submitter.into(),
            title: title.into(),
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Verbatim `From:` header of the source email
    #[must_use]
    pub fn submitter(&self) -> &str {
        &self.submitter
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Read and parse an email file
pub fn read_email(path: &Path) -> Result<EmailData> {
    let raw = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_email(&raw)
}

/// Parse raw email bytes into an [`EmailData`].
///
/// The input must be valid UTF-8. Multipart messages are walked depth-first;
/// the first `text/plain` and the first `text/html` part win.
pub fn parse_email(raw: &[u8]) -> Result<EmailData> {
    std::str::from_utf8(raw).map_err(|e| ParseError::Decode(e.to_string()))?;

    let parsed = mailparse::parse_mail(raw).map_err(|e| ParseError::Structure(e.to_string()))?;

    let mut parts = BodyParts::default();
    walk_parts(&parsed, &mut parts)?;

    let email = EmailData {
        subject_header: header_value(&parsed.headers, "subject"),
        from_header: raw_header_value(&parsed.headers, "from"),
        text: parts.text.unwrap_or_default(),
        html: parts.html.unwrap_or_default(),
        attachments: parts.attachments,
    };

    debug!(
        subject = %email.subject_header,
        from = %email.from_header,
        attachments = email.attachments.len(),
        "Parsed email"
    );

    Ok(email)
}

fn header_value(headers: &[MailHeader], name: &str) -> String {
    headers
        .iter()
        .find(|h| h.get_key().eq_ignore_ascii_case(name))
        .map(MailHeader::get_value)
        .unwrap_or_default()
}

/// Header value without RFC 2047 decoding. Folding line breaks are removed;
/// the input has already been checked to be UTF-8.
fn raw_header_value(headers: &[MailHeader], name: &str) -> String {
    headers
        .iter()
        .find(|h| h.get_key().eq_ignore_ascii_case(name))
        .map(|h| {
            String::from_utf8_lossy(h.get_value_raw())
                .replace(['\r', '\n'], "")
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

#[derive(Default)]
struct BodyParts {
    text: Option<String>,
    html: Option<String>,
    attachments: Vec<String>,
}

fn walk_parts(part: &ParsedMail, parts: &mut BodyParts) -> Result<()> {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            walk_parts(sub, parts)?;
        }
        return Ok(());
    }

    let mimetype = part.ctype.mimetype.to_lowercase();
    match mimetype.as_str() {
        "text/plain" => {
            if parts.text.is_none() {
                parts.text = Some(decode_body(part)?);
            }
        }
        "text/html" => {
            if parts.html.is_none() {
                parts.html = Some(decode_body(part)?);
            }
        }
        // other text subtypes and empty multiparts carry nothing we use
        m if m.starts_with("text/") || m.starts_with("multipart/") => {}
        _ => parts.attachments.push(mimetype),
    }
    Ok(())
}

fn decode_body(part: &ParsedMail) -> Result<String> {
    part.get_body().map_err(|e| ParseError::Decode(e.to_string()))
}
