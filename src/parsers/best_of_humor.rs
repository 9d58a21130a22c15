//! "Best of Humor" daily mails.
//!
//! Jokes and adverts alternate between border lines such as `+-----+`,
//! `~~~~` or `_____ banner _____`. Every section between borders is a
//! candidate; advert and list-management lines are dropped and what is left
//! must still look like a joke.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::delimiter::LineMatcher;
use crate::email::{EmailData, JokeData};
use crate::registry::{JokeParser, ParserEntry};
use crate::selector::ContentPreference;

const BORDERS: [LineMatcher; 3] = [
    LineMatcher::Enclosed('+', '+'),
    LineMatcher::Enclosed('~', '~'),
    LineMatcher::Enclosed('_', '_'),
];

static PROMO_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)http|<a\b|mailto:|best ?of ?humor|email4fun|^(?:subscribe|join|unsub)|^___")
        .unwrap()
});

static PROMO_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)free|win|click|enter now|subscribe|join|visit").unwrap());

/// Sections with fewer non-blank lines are treated as noise
const MIN_LINES: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct BestOfHumor;

impl JokeParser for BestOfHumor {
    fn parse(&self, email: &EmailData, body: &str) -> Vec<JokeData> {
        let lines: Vec<&str> = body.lines().collect();
        if !lines.iter().any(|l| is_border(l)) {
            return Vec::new();
        }

        lines
            .split(|l| is_border(l))
            .filter_map(clean_section)
            .filter_map(|text| JokeData::new(&text, email.from_header.clone(), ""))
            .collect()
    }
}

fn is_border(line: &str) -> bool {
    BORDERS.iter().any(|m| m.matches(line))
}

fn clean_section(section: &[&str]) -> Option<String> {
    let kept: Vec<&str> = section
        .iter()
        .copied()
        .filter(|l| !PROMO_LINE.is_match(l.trim()))
        .collect();
    let text = kept.join("\n").trim().to_string();

    let non_blank: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if non_blank.len() < MIN_LINES {
        return None;
    }

    let promo = non_blank.iter().filter(|l| PROMO_WORD.is_match(l)).count();
    if promo * 2 > non_blank.len() {
        debug!(lines = non_blank.len(), promo, "Skipping promotional section");
        return None;
    }

    Some(text)
}

fn is_eligible(email: &EmailData) -> bool {
    super::from_contains(email, "bestofhumor.com")
}

#[must_use]
pub fn entry() -> ParserEntry {
    ParserEntry::new("best-of-humor", is_eligible, BestOfHumor)
        .with_priority(super::SENDER_PRIORITY)
        .with_preference(ContentPreference::TextFirst)
}
