//! Generic submissions to the Good Clean Funnies List. Accepts any sender, so
//! it is registered with the lowest priority.

use crate::delimiter::{DelimiterSpec, LineMatcher, Repeat};
use crate::email::EmailData;
use crate::registry::ParserEntry;

pub const SPEC: DelimiterSpec =
    DelimiterSpec::new(LineMatcher::Prefix("HUMOR"), LineMatcher::Prefix("<><"))
        .repeating(Repeat::Rescan);

const fn is_eligible(_email: &EmailData) -> bool {
    true
}

#[must_use]
pub fn entry() -> ParserEntry {
    ParserEntry::new("gcfl", is_eligible, SPEC).with_priority(super::FALLBACK_PRIORITY)
}
