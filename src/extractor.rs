//! Extractors: independent attempts at pulling jokes out of one email.
//!
//! Every extractor gets the same two inputs, the source email path and an
//! output directory, and answers with an [`ExtractorStatus`]. Failures are
//! reported through the status, never as a Rust error.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use tracing::{debug, warn};

use crate::email::{EmailData, JokeData, read_email};
use crate::error::ExtractError;
use crate::registry::{ParserRegistry, default_registry};
use crate::selector::{ContentPreference, select_content};
use crate::status::ExtractorStatus;
use crate::store::publish_jokes;

/// Capability shared by in-process and out-of-process extractors
pub trait Extractor {
    /// Name used for ordering and in diagnostics
    fn name(&self) -> &str;

    fn attempt(&self, source: &Path, output_dir: &Path) -> ExtractorStatus;
}

impl ExtractError {
    /// Status code reported for this failure
    #[must_use]
    pub fn status(&self) -> ExtractorStatus {
        let code = match self {
            Self::MissingInput(_) => ExtractorStatus::MISSING_INPUT,
            Self::Parse(_) => ExtractorStatus::PARSE_FAILURE,
            Self::OutputDir { .. } | Self::Persist(_) => ExtractorStatus::WRITE_FAILURE,
        };
        ExtractorStatus::new(code, self.to_string())
    }
}

/// Shared flow of the in-process extractors: load the email, run `extract`
/// and publish every joke it returns.
fn run_in_process(
    name: &str,
    source: &Path,
    output_dir: &Path,
    extract: impl FnOnce(&EmailData) -> Vec<JokeData>,
) -> ExtractorStatus {
    match extract_and_publish(source, output_dir, extract) {
        Ok(0) => {
            debug!(extractor = name, "No joke found");
            ExtractorStatus::no_joke()
        }
        Ok(count) => ExtractorStatus::success(count),
        Err(err) => {
            warn!(extractor = name, error = %err, "Extraction failed");
            err.status()
        }
    }
}

fn extract_and_publish(
    source: &Path,
    output_dir: &Path,
    extract: impl FnOnce(&EmailData) -> Vec<JokeData>,
) -> Result<usize, ExtractError> {
    if !source.exists() {
        return Err(ExtractError::MissingInput(source.to_path_buf()));
    }
    std::fs::metadata(output_dir).map_err(|source| ExtractError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let email = read_email(source)?;
    let jokes = extract(&email);
    publish_jokes(output_dir, jokes.iter().map(JokeData::text))?;
    Ok(jokes.len())
}

/// Runs the parser registry: the resolved parser decides which body it
/// reads and how jokes are delimited.
#[derive(Debug, Clone, Copy)]
pub struct RegistryExtractor {
    registry: &'static ParserRegistry,
}

impl RegistryExtractor {
    pub const NAME: &'static str = "01-extract-text";

    #[must_use]
    pub const fn new(registry: &'static ParserRegistry) -> Self {
        Self { registry }
    }
}

impl Default for RegistryExtractor {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl Extractor for RegistryExtractor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn attempt(&self, source: &Path, output_dir: &Path) -> ExtractorStatus {
        run_in_process(Self::NAME, source, output_dir, |email| {
            self.registry.extract(email)
        })
    }
}

/// Last resort: the whole cleaned body, plain text preferred, becomes one
/// joke titled after the subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeBodyExtractor;

impl WholeBodyExtractor {
    pub const NAME: &'static str = "default";
}

impl Extractor for WholeBodyExtractor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn attempt(&self, source: &Path, output_dir: &Path) -> ExtractorStatus {
        run_in_process(Self::NAME, source, output_dir, |email| {
            select_content(email, ContentPreference::TextFirst)
                .and_then(|content| {
                    JokeData::new(
                        &content.text,
                        email.from_header.clone(),
                        email.clean_subject(),
                    )
                })
                .into_iter()
                .collect()
        })
    }
}

/// Runs an external program as `<program> <email> <output-dir>` and reads
/// the status from the first line of its stdout.
#[derive(Debug, Clone)]
pub struct ProcessExtractor {
    name: String,
    program: PathBuf,
}

impl ProcessExtractor {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map_or_else(|| program.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self { name, program }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Extractor for ProcessExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, source: &Path, output_dir: &Path) -> ExtractorStatus {
        let mut command = Command::new(&self.program);
        command
            .arg(source)
            .arg(output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match output_with_retry(&mut command) {
            Ok(output) => output,
            Err(err) => {
                return ExtractorStatus::protocol_violation(format!(
                    "Failed to run {}: {err}",
                    self.program.display()
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return ExtractorStatus::protocol_violation(format!(
                "Extractor exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        ExtractorStatus::from_stdout(&String::from_utf8_lossy(&output.stdout))
    }
}

/// A freshly written executable can briefly report ETXTBSY while another
/// thread still holds a write handle; retry those with a short backoff.
fn output_with_retry(command: &mut Command) -> io::Result<Output> {
    let mut backoff = Duration::from_millis(2);
    let mut attempt = 0;
    loop {
        match command.output() {
            Err(err) if is_text_busy(&err) && attempt < 4 => {
                std::thread::sleep(backoff);
                backoff = std::cmp::min(backoff * 2, Duration::from_millis(50));
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn is_text_busy(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::ExecutableFileBusy) || err.raw_os_error() == Some(26)
}
