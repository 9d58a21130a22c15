// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Joke extraction from archived email
//!
//! An email is parsed into an [`EmailData`], validated, and handed to a
//! sequence of extractors. The built-in text extractor resolves a parser
//! from the [`ParserRegistry`] by sender, picks the body the parser prefers
//! and runs its delimiter layout over it, publishing every joke found as a
//! file. Extractors report an [`ExtractorStatus`]; the [`Pipeline`] stops at
//! the first success.
//!
//! # Example
//!
//! ```rust
//! use joke_extract::{default_registry, parse_email};
//!
//! let raw = b"From: a@b.com\r\nSubject: Funny\r\n\r\n\
//!             HUMOR\nShort Title\nJoke body line one\n\n<>< \nFooter";
//! let email = parse_email(raw).unwrap();
//! let jokes = default_registry().extract(&email);
//!
//! assert_eq!(jokes.len(), 1);
//! assert_eq!(jokes[0].title(), "Short Title");
//! assert_eq!(jokes[0].text(), "Joke body line one");
//! ```

pub mod config;
pub mod delimiter;
mod email;
mod error;
pub mod extractor;
pub mod logging;
pub mod parsers;
pub mod pipeline;
pub mod registry;
pub mod selector;
pub mod status;
pub mod store;

pub use delimiter::{DelimiterSpec, LineMatcher, Repeat, TitleRule, WhitespacePolicy, scan};
pub use email::{EmailData, JokeData, parse_email, read_email};
pub use error::{ExtractError, ParseError, Result, ValidationError};
pub use extractor::{Extractor, ProcessExtractor, RegistryExtractor, WholeBodyExtractor};
pub use pipeline::{Attempt, Pipeline, PipelineOutcome, check_email, validate_email};
pub use registry::{JokeParser, ParserEntry, ParserRegistry, RegistryBuilder, default_registry};
pub use selector::{ContentPreference, ContentSource, SelectedContent, select_content};
pub use status::{ExtractorStatus, StatusBand};
