//! Parser registry: which parser handles which email

use std::sync::LazyLock;

use tracing::debug;

use crate::delimiter::{DelimiterSpec, scan};
use crate::email::{EmailData, JokeData};
use crate::parsers;
use crate::selector::{ContentPreference, select_content};

/// Header-only eligibility check. Must not look at the body and must not
/// have side effects.
pub type Eligibility = fn(&EmailData) -> bool;

/// Turns a selected body into jokes
pub trait JokeParser: Send + Sync {
    fn parse(&self, email: &EmailData, body: &str) -> Vec<JokeData>;
}

impl JokeParser for DelimiterSpec {
    fn parse(&self, email: &EmailData, body: &str) -> Vec<JokeData> {
        scan(self, body, email)
    }
}

/// A registered parser with its eligibility rule and content preference
pub struct ParserEntry {
    name: &'static str,
    priority: i32,
    eligible: Eligibility,
    preference: ContentPreference,
    parser: Box<dyn JokeParser>,
}

impl ParserEntry {
    pub fn new(name: &'static str, eligible: Eligibility, parser: impl JokeParser + 'static) -> Self {
        Self {
            name,
            priority: 0,
            eligible,
            preference: ContentPreference::default(),
            parser: Box::new(parser),
        }
    }

    /// Higher priorities are consulted first
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_preference(mut self, preference: ContentPreference) -> Self {
        self.preference = preference;
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub const fn preference(&self) -> ContentPreference {
        self.preference
    }

    #[must_use]
    pub fn is_eligible(&self, email: &EmailData) -> bool {
        (self.eligible)(email)
    }

    /// Select this parser's preferred body and parse it
    #[must_use]
    pub fn extract(&self, email: &EmailData) -> Vec<JokeData> {
        let Some(content) = select_content(email, self.preference) else {
            debug!(parser = self.name, "No usable body content");
            return Vec::new();
        };
        debug!(parser = self.name, source = ?content.source, "Parsing body");
        self.parser.parse(email, &content.text)
    }
}

impl std::fmt::Debug for ParserEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserEntry")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("preference", &self.preference)
            .finish_non_exhaustive()
    }
}

/// Collects entries during startup; [`RegistryBuilder::build`] freezes them
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<ParserEntry>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn register(mut self, entry: ParserEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Order entries by descending priority. The sort is stable, so equal
    /// priorities keep registration order.
    #[must_use]
    pub fn build(mut self) -> ParserRegistry {
        self.entries.sort_by_key(|e| std::cmp::Reverse(e.priority));
        ParserRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable, ordered set of parsers
#[derive(Debug)]
pub struct ParserRegistry {
    entries: Vec<ParserEntry>,
}

impl ParserRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// First eligible entry in priority order
    #[must_use]
    pub fn resolve(&self, email: &EmailData) -> Option<&ParserEntry> {
        self.entries.iter().find(|entry| entry.is_eligible(email))
    }

    /// Run the resolved parser, if any. At most one parser runs per email.
    #[must_use]
    pub fn extract(&self, email: &EmailData) -> Vec<JokeData> {
        match self.resolve(email) {
            Some(entry) => entry.extract(email),
            None => {
                debug!(from = %email.from_header, "No parser accepts this email");
                Vec::new()
            }
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &ParserEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static DEFAULT_REGISTRY: LazyLock<ParserRegistry> =
    LazyLock::new(|| parsers::register_all(ParserRegistry::builder()).build());

/// The registry holding every built-in parser, built on first use
#[must_use]
pub fn default_registry() -> &'static ParserRegistry {
    &DEFAULT_REGISTRY
}
