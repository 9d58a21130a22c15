//! The orchestrator: validate an email, then try extractors in name order
//! until one reports success.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::email::{EmailData, read_email};
use crate::error::ValidationError;
use crate::extractor::{Extractor, ProcessExtractor, RegistryExtractor, WholeBodyExtractor};
use crate::status::{ExtractorStatus, StatusBand};

/// Load `path` and reject emails no extractor should see
pub fn validate_email(path: &Path) -> Result<EmailData, ValidationError> {
    if !path.is_file() {
        return Err(ValidationError::Unreadable {
            path: path.to_path_buf(),
        });
    }
    let email = read_email(path)?;
    check_email(&email)?;
    Ok(email)
}

/// Header and attachment rules every input must pass
pub fn check_email(email: &EmailData) -> Result<(), ValidationError> {
    if email.subject_header.trim().is_empty() {
        return Err(ValidationError::MissingSubject);
    }
    if email.from_header.trim().is_empty() {
        return Err(ValidationError::EmptyFrom);
    }
    if let Some(mimetype) = email.attachments.first() {
        return Err(ValidationError::NonTextAttachment(mimetype.clone()));
    }
    Ok(())
}

/// One extractor's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub extractor: String,
    pub band: StatusBand,
    #[serde(flatten)]
    pub status: ExtractorStatus,
}

/// Everything that happened while processing one email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    pub source: PathBuf,
    pub attempts: Vec<Attempt>,
}

impl PipelineOutcome {
    /// The attempt that reported success; it is always the last one
    #[must_use]
    pub fn winner(&self) -> Option<&Attempt> {
        self.attempts.last().filter(|a| a.band == StatusBand::Success)
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.winner().is_some()
    }
}

/// Ordered extractors, tried one at a time
pub struct Pipeline {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Pipeline {
    /// Extractors are ordered lexicographically by name so that runs are
    /// reproducible regardless of how they were collected.
    #[must_use]
    pub fn new(mut extractors: Vec<Box<dyn Extractor>>) -> Self {
        extractors.sort_by(|a, b| a.name().cmp(b.name()));
        Self { extractors }
    }

    /// The built-in registry and whole-body extractors
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new(builtin_extractors())
    }

    #[must_use]
    pub fn extractor_names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Validate `source`, then run the extractors
    pub fn process(
        &self,
        source: &Path,
        output_dir: &Path,
    ) -> Result<PipelineOutcome, ValidationError> {
        validate_email(source)?;
        Ok(self.run(source, output_dir))
    }

    /// Try each extractor in order, stopping at the first success. Errors
    /// and unknown codes are logged and the next extractor is tried.
    #[must_use]
    pub fn run(&self, source: &Path, output_dir: &Path) -> PipelineOutcome {
        let mut attempts = Vec::new();

        for extractor in &self.extractors {
            let name = extractor.name();
            info!(extractor = name, "Running extractor");
            let status = extractor.attempt(source, output_dir);
            let band = status.band();

            match band {
                StatusBand::Success => {
                    debug!(extractor = name, code = status.code, "Extractor reported success");
                }
                StatusBand::NoJoke => {
                    debug!(extractor = name, code = status.code, "Extractor found no joke");
                }
                StatusBand::Error => {
                    warn!(extractor = name, %status, "Extractor reported error");
                }
                StatusBand::Unknown => {
                    warn!(extractor = name, %status, "Extractor returned unexpected code");
                }
            }

            attempts.push(Attempt {
                extractor: name.to_string(),
                band,
                status,
            });
            if band == StatusBand::Success {
                break;
            }
        }

        let outcome = PipelineOutcome {
            source: source.to_path_buf(),
            attempts,
        };
        if !outcome.succeeded() {
            info!(source = %source.display(), "No joke found in email");
        }
        outcome
    }
}

#[must_use]
pub fn builtin_extractors() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(RegistryExtractor::default()),
        Box::new(WholeBodyExtractor),
    ]
}

/// Executable files in `dir`, sorted by file name. Hidden files are skipped.
pub fn discover_extractors(dir: &Path) -> io::Result<Vec<ProcessExtractor>> {
    let mut programs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && is_executable(&path) {
            programs.push(path);
        }
    }
    programs.sort();
    Ok(programs.into_iter().map(ProcessExtractor::new).collect())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
