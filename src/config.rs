//! Runtime configuration, from command-line flags with environment fallbacks

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::extractor::{Extractor, RegistryExtractor, WholeBodyExtractor};
use crate::pipeline::{Pipeline, builtin_extractors, discover_extractors};
use crate::status::ExtractorStatus;

/// Extract jokes from an archived email
#[derive(Debug, Clone, Parser)]
#[command(name = "joke-extract", version)]
pub struct PipelineArgs {
    /// Email file to process
    pub email: PathBuf,

    /// Directory joke files are written to
    #[arg(long, env = "JOKE_OUTPUT_DIR", default_value = "jokes")]
    pub output_dir: PathBuf,

    /// Directory of external extractor programs
    #[arg(long, env = "JOKE_EXTRACTORS_DIR")]
    pub extractors_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "JOKE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Resolved settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub email: PathBuf,
    pub output_dir: PathBuf,
    pub extractors_dir: Option<PathBuf>,
    pub log_level: String,
    pub json: bool,
}

impl From<PipelineArgs> for PipelineConfig {
    fn from(args: PipelineArgs) -> Self {
        Self {
            email: args.email,
            output_dir: args.output_dir,
            extractors_dir: args.extractors_dir,
            log_level: args.log_level,
            json: args.json,
        }
    }
}

impl PipelineConfig {
    pub fn ensure_output_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)
    }

    /// Built-in extractors plus any programs found in the extractors
    /// directory. A configured directory that cannot be read is an error.
    pub fn pipeline(&self) -> io::Result<Pipeline> {
        let mut extractors = builtin_extractors();
        if let Some(dir) = &self.extractors_dir {
            for program in discover_extractors(dir)? {
                extractors.push(Box::new(program));
            }
        }
        Ok(Pipeline::new(extractors))
    }
}

/// Built-in extractor exposed by `joke-extractor`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExtractorKind {
    /// Parser registry
    #[default]
    Text,
    /// Whole body as a single joke
    WholeBody,
}

impl ExtractorKind {
    #[must_use]
    pub fn extractor(self) -> Box<dyn Extractor> {
        match self {
            Self::Text => Box::new(RegistryExtractor::default()),
            Self::WholeBody => Box::new(WholeBodyExtractor),
        }
    }

    #[must_use]
    pub fn run(self, source: &Path, output_dir: &Path) -> ExtractorStatus {
        self.extractor().attempt(source, output_dir)
    }
}

/// Run one built-in extractor against an email
#[derive(Debug, Clone, Parser)]
#[command(name = "joke-extractor", version)]
pub struct ExtractorArgs {
    /// Email file to read
    pub email: PathBuf,

    /// Existing directory joke files are written to
    pub output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = ExtractorKind::Text)]
    pub kind: ExtractorKind,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "JOKE_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}
