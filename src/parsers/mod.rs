//! Built-in parsers, one module per mailing list layout.
//!
//! Each module exposes an `entry()` and has a companion note under
//! `docs/parsers/` describing the layout it encodes.

pub mod best_of_humor;
pub mod ellsworth;
pub mod gcfl;
pub mod sanderson;
pub mod you_make_me_laugh;

use crate::registry::RegistryBuilder;

/// Priority of parsers bound to a single sender
pub const SENDER_PRIORITY: i32 = 100;

/// Priority of the catch-all parser
pub const FALLBACK_PRIORITY: i32 = 0;

/// Register every built-in parser
#[must_use]
pub fn register_all(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(ellsworth::entry())
        .register(you_make_me_laugh::entry())
        .register(sanderson::entry())
        .register(best_of_humor::entry())
        .register(gcfl::entry())
}

fn from_contains(email: &crate::EmailData, needle: &str) -> bool {
    email.from_header.to_lowercase().contains(needle)
}
