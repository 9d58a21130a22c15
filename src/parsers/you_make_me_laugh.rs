//! "You Make Me Laugh" mails sent through Crosswalk

use crate::delimiter::{DelimiterSpec, LineMatcher, TitleRule, WhitespacePolicy};
use crate::email::EmailData;
use crate::registry::ParserEntry;
use crate::selector::ContentPreference;

/// The bar is followed by one banner line, then an optional
/// "... Newsletters" line, then the joke.
pub const SPEC: DelimiterSpec = DelimiterSpec::new(
    LineMatcher::TrimmedPrefix("__________"),
    LineMatcher::Exact("cybersalt.org/cleanlaugh"),
)
.skipping_after_start(1)
.ignoring(LineMatcher::Suffix("Newsletters"))
.with_title(TitleRule::Subject {
    strip_prefix: None,
    strip_trailing_date: true,
})
.with_whitespace(WhitespacePolicy::KeepParagraphs);

fn is_eligible(email: &EmailData) -> bool {
    super::from_contains(email, "crosswalk@crosswalkmail.com")
}

#[must_use]
pub fn entry() -> ParserEntry {
    ParserEntry::new("you-make-me-laugh", is_eligible, SPEC)
        .with_priority(super::SENDER_PRIORITY)
        .with_preference(ContentPreference::TextOnly)
}
