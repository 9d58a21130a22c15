use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use joke_extract::store::is_joke_file;
use joke_extract::*;
use tempfile::TempDir;

const HUMOR_EMAIL: &str = "From: friend@example.com\r\n\
Subject: Funny\r\n\
\r\n\
HUMOR\n\
Short Title\n\
Joke body line one\n\
\n\
<><\n\
Footer\n";

fn write_email(dir: &TempDir, name: &str, raw: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, raw).unwrap();
    path
}

fn joke_files(dir: &Path) -> Vec<String> {
    let mut texts: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| is_joke_file(p))
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();
    texts.sort();
    texts
}

fn leftover_staging_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(".tmp")
        })
        .count()
}

/// Extractor with a fixed answer that counts how often it ran
struct Scripted {
    name: &'static str,
    status: ExtractorStatus,
    calls: Rc<Cell<usize>>,
}

impl Scripted {
    fn boxed(name: &'static str, code: u16, calls: &Rc<Cell<usize>>) -> Box<dyn Extractor> {
        Box::new(Self {
            name,
            status: ExtractorStatus::new(code, "scripted"),
            calls: Rc::clone(calls),
        })
    }
}

impl Extractor for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn attempt(&self, _source: &Path, _output_dir: &Path) -> ExtractorStatus {
        self.calls.set(self.calls.get() + 1);
        self.status.clone()
    }
}

#[test]
fn test_generic_humor_email_publishes_one_joke() {
    let inbox = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let email = write_email(&inbox, "a.eml", HUMOR_EMAIL);

    let outcome = Pipeline::with_builtins().process(&email, out.path()).unwrap();

    assert!(outcome.succeeded());
    assert_eq!(outcome.attempts.len(), 1);
    let winner = outcome.winner().unwrap();
    assert_eq!(winner.extractor, RegistryExtractor::NAME);
    assert_eq!(winner.status.code, 100);
    assert_eq!(joke_files(out.path()), vec!["Joke body line one".to_string()]);
    assert_eq!(leftover_staging_files(out.path()), 0);
}

#[test]
fn test_empty_body_exhausts_every_extractor() {
    let inbox = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let email = write_email(
        &inbox,
        "b.eml",
        "From: friend@example.com\r\nSubject: Nothing\r\n\r\n   \n",
    );

    let outcome = Pipeline::with_builtins().process(&email, out.path()).unwrap();

    assert!(!outcome.succeeded());
    assert_eq!(outcome.attempts.len(), 2);
    assert!(outcome.attempts.iter().all(|a| a.band == StatusBand::NoJoke));
    assert!(joke_files(out.path()).is_empty());
}

#[test]
fn test_pdf_attachment_is_rejected_before_extraction() {
    let inbox = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let email = write_email(
        &inbox,
        "c.eml",
        "From: friend@example.com\r\n\
Subject: With attachment\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XX\"\r\n\
\r\n\
--XX\r\n\
Content-Type: text/plain\r\n\
\r\n\
HUMOR\r\nTitle\r\nBody\r\n<><\r\n\
--XX\r\n\
Content-Type: application/pdf\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0xLjQK\r\n\
--XX--\r\n",
    );

    let err = Pipeline::with_builtins()
        .process(&email, out.path())
        .unwrap_err();

    assert!(matches!(err, ValidationError::NonTextAttachment(ref m) if m == "application/pdf"));
    assert!(joke_files(out.path()).is_empty());
}

#[test]
fn test_empty_from_is_rejected() {
    let inbox = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let email = write_email(&inbox, "d.eml", "From: \r\nSubject: Hi\r\n\r\nHUMOR\nT\nB\n<><\n");

    let err = Pipeline::with_builtins()
        .process(&email, out.path())
        .unwrap_err();

    assert!(matches!(err, ValidationError::EmptyFrom));
    assert!(joke_files(out.path()).is_empty());
}

#[test]
fn test_missing_subject_is_rejected() {
    let inbox = TempDir::new().unwrap();
    let email = write_email(&inbox, "e.eml", "From: a@b.com\r\n\r\nbody\n");

    let err = validate_email(&email).unwrap_err();

    assert!(matches!(err, ValidationError::MissingSubject));
}

#[test]
fn test_missing_file_is_unreadable() {
    let inbox = TempDir::new().unwrap();

    let err = validate_email(&inbox.path().join("absent.eml")).unwrap_err();

    assert!(matches!(err, ValidationError::Unreadable { .. }));
}

#[test]
fn test_stops_at_first_success() {
    let inbox = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let email = write_email(&inbox, "e.eml", HUMOR_EMAIL);

    let a_calls = Rc::new(Cell::new(0));
    let b_calls = Rc::new(Cell::new(0));
    let c_calls = Rc::new(Cell::new(0));
    let pipeline = Pipeline::new(vec![
        Scripted::boxed("c", 100, &c_calls),
        Scripted::boxed("b", 100, &b_calls),
        Scripted::boxed("a", 502, &a_calls),
    ]);

    let outcome = pipeline.process(&email, out.path()).unwrap();

    assert_eq!(pipeline.extractor_names(), vec!["a", "b", "c"]);
    assert_eq!((a_calls.get(), b_calls.get(), c_calls.get()), (1, 1, 0));
    assert!(outcome.succeeded());
    assert_eq!(outcome.winner().unwrap().extractor, "b");
    assert_eq!(outcome.attempts[0].band, StatusBand::Error);
}

#[test]
fn test_unknown_codes_do_not_stop_the_run() {
    let inbox = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let email = write_email(&inbox, "e.eml", HUMOR_EMAIL);
    let calls = Rc::new(Cell::new(0));
    let pipeline = Pipeline::new(vec![
        Scripted::boxed("1", 404, &calls),
        Scripted::boxed("2", 250, &calls),
        Scripted::boxed("3", 150, &calls),
    ]);

    let outcome = pipeline.run(&email, out.path());

    assert_eq!(calls.get(), 3);
    let bands: Vec<StatusBand> = outcome.attempts.iter().map(|a| a.band).collect();
    assert_eq!(
        bands,
        vec![StatusBand::Unknown, StatusBand::NoJoke, StatusBand::Success]
    );
}

#[test]
fn test_builtin_order_is_by_name() {
    assert_eq!(
        Pipeline::with_builtins().extractor_names(),
        vec![RegistryExtractor::NAME, WholeBodyExtractor::NAME]
    );
}

#[test]
fn test_whole_body_extractor_takes_over() {
    let inbox = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let email = write_email(
        &inbox,
        "f.eml",
        "From: friend@example.com\r\nSubject: Fwd: Ducks\r\n\r\n\
> A duck walks into a bar.\n>\n> The bartender sighs.\n",
    );

    let outcome = Pipeline::with_builtins().process(&email, out.path()).unwrap();

    assert_eq!(outcome.winner().unwrap().extractor, WholeBodyExtractor::NAME);
    assert_eq!(outcome.attempts[0].band, StatusBand::NoJoke);
    assert_eq!(
        joke_files(out.path()),
        vec!["A duck walks into a bar.\n\nThe bartender sighs.".to_string()]
    );
}

#[test]
fn test_reruns_produce_the_same_jokes() {
    let inbox = TempDir::new().unwrap();
    let email = write_email(
        &inbox,
        "g.eml",
        "From: friend@example.com\r\nSubject: Two\r\n\r\n\
HUMOR\nFirst\nOne\n<><\nHUMOR\nSecond\nTwo\n<><\n",
    );
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let pipeline = Pipeline::with_builtins();
    assert!(pipeline.process(&email, first.path()).unwrap().succeeded());
    assert!(pipeline.process(&email, second.path()).unwrap().succeeded());

    assert_eq!(joke_files(first.path()), vec!["One".to_string(), "Two".to_string()]);
    assert_eq!(joke_files(first.path()), joke_files(second.path()));
}

#[test]
fn test_missing_output_dir_reports_write_failure() {
    let inbox = TempDir::new().unwrap();
    let email = write_email(&inbox, "h.eml", HUMOR_EMAIL);

    let status = RegistryExtractor::default().attempt(&email, &inbox.path().join("missing"));

    assert_eq!(status.code, ExtractorStatus::WRITE_FAILURE);
}

#[test]
fn test_missing_input_reports_501() {
    let out = TempDir::new().unwrap();

    let status = WholeBodyExtractor.attempt(&out.path().join("gone.eml"), out.path());

    assert_eq!(status.code, ExtractorStatus::MISSING_INPUT);
}

#[test]
fn test_outcome_serializes_flat_attempts() {
    let inbox = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let email = write_email(&inbox, "i.eml", HUMOR_EMAIL);

    let outcome = Pipeline::with_builtins().process(&email, out.path()).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["attempts"][0]["extractor"], "01-extract-text");
    assert_eq!(json["attempts"][0]["band"], "success");
    assert_eq!(json["attempts"][0]["code"], 100);
}

#[cfg(unix)]
mod external {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    fn script(dir: &TempDir, name: &str, body: &str, mode: u32) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_status_line_is_read_from_stdout() {
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let program = script(&bin, "02-check", "echo '502 parse failure'\necho ignored", 0o755);

        let status = ProcessExtractor::new(program).attempt(Path::new("x.eml"), out.path());

        assert_eq!(status, ExtractorStatus::new(502, "parse failure"));
    }

    #[test]
    fn test_program_receives_email_and_output_dir() {
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let program = script(
            &bin,
            "03-copy",
            "cp \"$1\" \"$2/joke_copy.txt\" && echo '100 copied'",
            0o755,
        );
        let inbox = TempDir::new().unwrap();
        let email = write_email(&inbox, "j.eml", HUMOR_EMAIL);

        let status = ProcessExtractor::new(program).attempt(&email, out.path());

        assert!(status.is_success());
        assert!(out.path().join("joke_copy.txt").is_file());
    }

    #[test]
    fn test_nonzero_exit_is_a_protocol_violation() {
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let program = script(&bin, "04-crash", "echo '100 lies'\nexit 3", 0o755);

        let status = ProcessExtractor::new(program).attempt(Path::new("x.eml"), out.path());

        assert_eq!(status.code, ExtractorStatus::PROTOCOL_VIOLATION);
    }

    #[test]
    fn test_garbage_output_is_a_protocol_violation() {
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let program = script(&bin, "05-noise", "echo 'all good'", 0o755);

        let status = ProcessExtractor::new(program).attempt(Path::new("x.eml"), out.path());

        assert_eq!(status.code, ExtractorStatus::PROTOCOL_VIOLATION);
    }

    #[test]
    fn test_discovery_finds_executables_in_name_order() {
        let bin = TempDir::new().unwrap();
        script(&bin, "20-second", "echo '200 none'", 0o755);
        script(&bin, "10-first", "echo '200 none'", 0o755);
        script(&bin, "15-not-executable", "echo '100 x'", 0o644);
        script(&bin, ".hidden", "echo '100 x'", 0o755);
        fs::create_dir(bin.path().join("30-dir")).unwrap();

        let found = pipeline::discover_extractors(bin.path()).unwrap();
        let names: Vec<&str> = found.iter().map(|e| e.name()).collect();

        assert_eq!(names, vec!["10-first", "20-second"]);
        assert_eq!(found[0].program(), bin.path().join("10-first"));
    }

    #[test]
    fn test_external_extractors_join_builtins_by_name() {
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        script(&bin, "00-first", "echo '200 nothing here'", 0o755);
        let inbox = TempDir::new().unwrap();
        let email = write_email(&inbox, "k.eml", HUMOR_EMAIL);

        let mut extractors = pipeline::builtin_extractors();
        for program in pipeline::discover_extractors(bin.path()).unwrap() {
            extractors.push(Box::new(program));
        }
        let pipeline = Pipeline::new(extractors);
        let outcome = pipeline.process(&email, out.path()).unwrap();

        assert_eq!(
            pipeline.extractor_names(),
            vec!["00-first", "01-extract-text", "default"]
        );
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(outcome.winner().unwrap().extractor, "01-extract-text");
    }
}
