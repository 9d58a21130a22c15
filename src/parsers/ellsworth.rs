//! "Good Clean Fun" mails from Thomas S. Ellsworth

use crate::delimiter::{DelimiterSpec, LineMatcher, TitleRule};
use crate::email::EmailData;
use crate::registry::ParserEntry;
use crate::selector::ContentPreference;

const RULE: LineMatcher = LineMatcher::Prefix("----------");

pub const SPEC: DelimiterSpec = DelimiterSpec::new(RULE, RULE).with_title(TitleRule::Subject {
    strip_prefix: Some("GCF: "),
    strip_trailing_date: false,
});

fn is_eligible(email: &EmailData) -> bool {
    super::from_contains(email, "tellswor@kcbx.net")
}

#[must_use]
pub fn entry() -> ParserEntry {
    ParserEntry::new("ellsworth", is_eligible, SPEC)
        .with_priority(super::SENDER_PRIORITY)
        .with_preference(ContentPreference::TextOnly)
}
