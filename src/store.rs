//! Publishing joke files so readers never see a partial write

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub const JOKE_PREFIX: &str = "joke_";
pub const JOKE_SUFFIX: &str = ".txt";

const STAGING_PREFIX: &str = ".joke_";
const STAGING_SUFFIX: &str = ".tmp";
const MAX_ATTEMPTS: usize = 8;

/// Write `text` to a new `joke_*.txt` file in `output_dir`.
///
/// The content goes to a hidden staging file first, is synced, and is then
/// renamed into place. Existing files are never replaced.
pub fn publish_joke(output_dir: &Path, text: &str) -> io::Result<PathBuf> {
    for _ in 0..MAX_ATTEMPTS {
        let mut staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(output_dir)?;
        staged.write_all(text.as_bytes())?;
        staged.flush()?;
        staged.as_file().sync_all()?;

        let final_path = output_dir.join(published_name(staged.path()));
        match staged.persist_noclobber(&final_path) {
            Ok(_) => {
                info!(path = %final_path.display(), "Published joke");
                return Ok(final_path);
            }
            // staging file is removed when the error drops
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err.error),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free joke file name in {}", output_dir.display()),
    ))
}

/// Publish every joke of one extraction, or none of them.
///
/// When a publish fails, the files already published by this call are
/// removed before the error is returned.
pub fn publish_jokes<'a>(
    output_dir: &Path,
    texts: impl IntoIterator<Item = &'a str>,
) -> io::Result<Vec<PathBuf>> {
    publish_all(texts, |text| publish_joke(output_dir, text))
}

fn publish_all<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    mut publish: impl FnMut(&str) -> io::Result<PathBuf>,
) -> io::Result<Vec<PathBuf>> {
    let mut published = Vec::new();
    for text in texts {
        match publish(text) {
            Ok(path) => published.push(path),
            Err(err) => {
                for path in &published {
                    if let Err(remove_err) = std::fs::remove_file(path) {
                        warn!(path = %path.display(), error = %remove_err, "Failed to roll back joke");
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(published)
}

/// `.joke_AbC123.tmp` becomes `joke_AbC123.txt`
fn published_name(staged: &Path) -> String {
    let name = staged
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name
        .strip_prefix(STAGING_PREFIX)
        .and_then(|n| n.strip_suffix(STAGING_SUFFIX))
        .unwrap_or(&name);
    format!("{JOKE_PREFIX}{stem}{JOKE_SUFFIX}")
}

/// Whether a directory entry looks like a published joke
#[must_use]
pub fn is_joke_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(JOKE_PREFIX) && n.ends_with(JOKE_SUFFIX))
}
