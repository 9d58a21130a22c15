//! Extractor status: a three-digit code plus a message.
//!
//! In process the status is a typed value. At a process boundary it travels
//! as the first stdout line, `"<code> <message>"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome class of a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBand {
    /// 100-199: a joke was extracted and published
    Success,
    /// 200-299: nothing found
    NoJoke,
    /// 500-599: the extractor failed
    Error,
    /// Anything else is a protocol violation
    Unknown,
}

impl StatusBand {
    #[must_use]
    pub const fn of(code: u16) -> Self {
        match code {
            100..=199 => Self::Success,
            200..=299 => Self::NoJoke,
            500..=599 => Self::Error,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorStatus {
    pub code: u16,
    pub message: String,
}

impl ExtractorStatus {
    pub const SUCCESS: u16 = 100;
    pub const NO_JOKE: u16 = 200;
    pub const USAGE: u16 = 500;
    pub const MISSING_INPUT: u16 = 501;
    pub const PARSE_FAILURE: u16 = 502;
    pub const WRITE_FAILURE: u16 = 503;
    pub const PROTOCOL_VIOLATION: u16 = 599;

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(jokes: usize) -> Self {
        if jokes == 1 {
            Self::new(Self::SUCCESS, "Successfully extracted joke")
        } else {
            Self::new(Self::SUCCESS, format!("Successfully extracted {jokes} jokes"))
        }
    }

    #[must_use]
    pub fn no_joke() -> Self {
        Self::new(Self::NO_JOKE, "No joke found")
    }

    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Self::new(Self::PROTOCOL_VIOLATION, message)
    }

    #[must_use]
    pub const fn band(&self) -> StatusBand {
        StatusBand::of(self.code)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.band(), StatusBand::Success)
    }

    /// Decode the status from an extractor's captured stdout. Only the first
    /// line counts; anything unreadable becomes a 599.
    #[must_use]
    pub fn from_stdout(stdout: &str) -> Self {
        let first = stdout.trim().lines().next().unwrap_or_default();
        if first.is_empty() {
            return Self::protocol_violation("Extractor printed no status line");
        }
        first
            .parse()
            .unwrap_or_else(|err: StatusParseError| Self::protocol_violation(err.to_string()))
    }
}

impl fmt::Display for ExtractorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03} {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed status line: {0:?}")]
pub struct StatusParseError(String);

impl FromStr for ExtractorStatus {
    type Err = StatusParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (code, message) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StatusParseError(line.to_string()));
        }
        let code = code
            .parse()
            .map_err(|_| StatusParseError(line.to_string()))?;
        Ok(Self::new(code, message.trim()))
    }
}
