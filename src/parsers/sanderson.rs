//! Steve Sanderson's "Sunday Fun Stuff" digests

use crate::delimiter::{DelimiterSpec, LineMatcher, Repeat, TitleRule};
use crate::email::EmailData;
use crate::registry::ParserEntry;
use crate::selector::ContentPreference;

/// One `**********` rule opens the digest; every joke after it is closed by a
/// bracketed tag such as `[end]` and the signature ends the list.
pub const SPEC: DelimiterSpec = DelimiterSpec::new(
    LineMatcher::TrimmedPrefix("**********"),
    LineMatcher::Enclosed('[', ']'),
)
.with_stop(LineMatcher::Exact("Steve Sanderson"))
.with_title(TitleRule::TrailingColon)
.repeating(Repeat::Continuous);

fn is_eligible(email: &EmailData) -> bool {
    super::from_contains(email, "aardvark@illinois.edu")
}

#[must_use]
pub fn entry() -> ParserEntry {
    ParserEntry::new("sanderson", is_eligible, SPEC)
        .with_priority(super::SENDER_PRIORITY)
        .with_preference(ContentPreference::TextOnly)
}
