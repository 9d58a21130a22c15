//! Line-oriented extraction of jokes bounded by literal delimiter lines.
//!
//! A [`DelimiterSpec`] describes one mailing list's layout: which lines open
//! and close a joke, how a title is found, how body lines are joined and
//! whether more than one joke can follow. [`scan`] runs the spec over a body
//! and never fails; odd structure degrades to fewer jokes plus a warning.

use tracing::{debug, warn};

use crate::email::{EmailData, JokeData};

/// Longest line, in characters, the title heuristic accepts as a title
pub const DEFAULT_TITLE_MAX_LEN: usize = 35;

/// Predicate over a single body line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMatcher {
    /// Raw line starts with the literal, case-sensitive
    Prefix(&'static str),
    /// Trimmed line starts with the literal
    TrimmedPrefix(&'static str),
    /// Trimmed line equals the literal
    Exact(&'static str),
    /// Trimmed line ends with the literal
    Suffix(&'static str),
    /// Trimmed line opens and closes with the given characters, like `[end]`
    Enclosed(char, char),
}

impl LineMatcher {
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        match *self {
            Self::Prefix(marker) => line.starts_with(marker),
            Self::TrimmedPrefix(marker) => line.trim().starts_with(marker),
            Self::Exact(marker) => line.trim() == marker,
            Self::Suffix(marker) => line.trim().ends_with(marker),
            Self::Enclosed(open, close) => {
                let line = line.trim();
                line.len() >= 2 && line.starts_with(open) && line.ends_with(close)
            }
        }
    }
}

/// How the title of a joke is found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// First non-blank line after the start delimiter is the title when it is
    /// at most `max_len` characters long; it is title-cased. Longer lines
    /// start the body and the title stays empty.
    Heuristic { max_len: usize },
    /// First non-blank line is the title when it ends with `:`
    TrailingColon,
    /// Title comes from the cleaned subject. A first body line repeating the
    /// subject is dropped.
    Subject {
        strip_prefix: Option<&'static str>,
        strip_trailing_date: bool,
    },
    None,
}

/// How body lines are joined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WhitespacePolicy {
    /// Blank lines dropped, every remaining line becomes its own paragraph
    #[default]
    SkipBlank,
    /// Lines of a paragraph joined by a newline, paragraphs by a blank line
    KeepParagraphs,
}

/// What happens after a joke's end delimiter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Repeat {
    /// Stop after the first joke
    #[default]
    Single,
    /// Look for the next start delimiter
    Rescan,
    /// The next joke starts right away with title detection
    Continuous,
}

/// Layout of one kind of joke mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterSpec {
    pub start: LineMatcher,
    pub end: LineMatcher,
    /// Ends the whole scan once a joke has been opened, e.g. a signature
    pub stop: Option<LineMatcher>,
    /// Lines discarded right after the start delimiter
    pub skip_after_start: usize,
    /// Lines never copied into a title or body
    pub ignore: Option<LineMatcher>,
    pub title: TitleRule,
    pub whitespace: WhitespacePolicy,
    pub repeat: Repeat,
}

impl DelimiterSpec {
    #[must_use]
    pub const fn new(start: LineMatcher, end: LineMatcher) -> Self {
        Self {
            start,
            end,
            stop: None,
            skip_after_start: 0,
            ignore: None,
            title: TitleRule::Heuristic {
                max_len: DEFAULT_TITLE_MAX_LEN,
            },
            whitespace: WhitespacePolicy::SkipBlank,
            repeat: Repeat::Single,
        }
    }

    #[must_use]
    pub const fn with_stop(mut self, stop: LineMatcher) -> Self {
        self.stop = Some(stop);
        self
    }

    #[must_use]
    pub const fn skipping_after_start(mut self, lines: usize) -> Self {
        self.skip_after_start = lines;
        self
    }

    #[must_use]
    pub const fn ignoring(mut self, matcher: LineMatcher) -> Self {
        self.ignore = Some(matcher);
        self
    }

    #[must_use]
    pub const fn with_title(mut self, title: TitleRule) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub const fn with_whitespace(mut self, whitespace: WhitespacePolicy) -> Self {
        self.whitespace = whitespace;
        self
    }

    #[must_use]
    pub const fn repeating(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    fn ignores(&self, line: &str) -> bool {
        self.ignore.is_some_and(|m| m.matches(line))
    }

    fn stops_at(&self, line: &str) -> bool {
        self.stop.is_some_and(|m| m.matches(line))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    Title,
    Body,
    Done,
}

#[derive(Default)]
struct Record<'a> {
    title: String,
    lines: Vec<&'a str>,
}

/// Run `spec` over `body` and collect the jokes it delimits.
///
/// A body without a start delimiter yields no jokes and no diagnostic. A
/// joke whose end delimiter never shows up runs to the end of the input and
/// is kept with a warning.
#[must_use]
pub fn scan(spec: &DelimiterSpec, body: &str, email: &EmailData) -> Vec<JokeData> {
    let lines: Vec<&str> = body.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let subject = subject_title(spec.title, email);

    let mut jokes = Vec::new();
    let mut state = State::Scanning;
    let mut record = Record::default();
    let mut i = 0;

    while i < lines.len() && state != State::Done {
        let line = lines[i];

        if state != State::Scanning && spec.stops_at(line) {
            if state == State::Body {
                warn!(line = i + 1, "Stop marker reached before end delimiter");
                emit(spec, std::mem::take(&mut record), email, &mut jokes);
            }
            state = State::Done;
            break;
        }

        match state {
            State::Scanning => {
                i += 1;
                if spec.start.matches(line) {
                    i += spec.skip_after_start;
                    record = Record::default();
                    state = State::Title;
                }
            }
            State::Title => {
                if line.trim().is_empty() || spec.ignores(line) {
                    i += 1;
                } else if spec.end.matches(line) {
                    debug!(line = i + 1, "End delimiter right after start, nothing to extract");
                    i += 1;
                    state = after_end(spec.repeat);
                } else {
                    let (title, consumed) = detect_title(spec.title, line, subject.as_deref());
                    record.title = title;
                    if consumed {
                        i += 1;
                    }
                    state = State::Body;
                }
            }
            State::Body => {
                i += 1;
                if spec.end.matches(line) {
                    emit(spec, std::mem::take(&mut record), email, &mut jokes);
                    state = after_end(spec.repeat);
                } else if !spec.ignores(line) {
                    record.lines.push(line);
                }
            }
            State::Done => {}
        }
    }

    if state == State::Body {
        warn!("End delimiter not found, keeping text up to end of input");
        emit(spec, record, email, &mut jokes);
    }

    jokes
}

const fn after_end(repeat: Repeat) -> State {
    match repeat {
        Repeat::Single => State::Done,
        Repeat::Rescan => State::Scanning,
        Repeat::Continuous => State::Title,
    }
}

fn emit(spec: &DelimiterSpec, record: Record<'_>, email: &EmailData, jokes: &mut Vec<JokeData>) {
    let text = join_body(&record.lines, spec.whitespace);
    match JokeData::new(&text, email.from_header.clone(), record.title) {
        Some(joke) => jokes.push(joke),
        None => debug!("Dropping joke with empty body"),
    }
}

fn join_body(lines: &[&str], policy: WhitespacePolicy) -> String {
    match policy {
        WhitespacePolicy::SkipBlank => lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
        WhitespacePolicy::KeepParagraphs => {
            let mut paragraphs: Vec<Vec<&str>> = vec![Vec::new()];
            for line in lines.iter().map(|l| l.trim()) {
                if line.is_empty() {
                    if paragraphs.last().is_some_and(|p| !p.is_empty()) {
                        paragraphs.push(Vec::new());
                    }
                } else if let Some(current) = paragraphs.last_mut() {
                    current.push(line);
                }
            }
            paragraphs
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| p.join("\n"))
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    }
}

/// Returns the title and whether `line` was used up by it
fn detect_title(rule: TitleRule, line: &str, subject: Option<&str>) -> (String, bool) {
    let line = line.trim();
    match rule {
        TitleRule::Heuristic { max_len } => {
            if line.chars().count() <= max_len {
                (title_case(line), true)
            } else {
                (String::new(), false)
            }
        }
        TitleRule::TrailingColon => match line.strip_suffix(':') {
            Some(title) => (title.trim().to_string(), true),
            None => (String::new(), false),
        },
        TitleRule::Subject { .. } => {
            let title = subject.unwrap_or_default().to_string();
            // "GCF: Flat Tire" repeats a subject titled "Flat Tire"
            let repeats_subject = !title.is_empty()
                && (line == title
                    || line
                        .strip_suffix(title.as_str())
                        .is_some_and(|head| head.trim_end().ends_with(':')));
            (title, repeats_subject)
        }
        TitleRule::None => (String::new(), false),
    }
}

fn subject_title(rule: TitleRule, email: &EmailData) -> Option<String> {
    let TitleRule::Subject {
        strip_prefix,
        strip_trailing_date,
    } = rule
    else {
        return None;
    };

    let mut title = email.clean_subject();
    if let Some(prefix) = strip_prefix
        && let Some(rest) = title.strip_prefix(prefix)
    {
        title = rest.trim().to_string();
    }
    if strip_trailing_date && let Some((head, _date)) = title.rsplit_once('-') {
        title = head.trim().to_string();
    }
    Some(title)
}

/// Capitalise the first letter of every word and lowercase the rest
#[must_use]
pub fn title_case(line: &str) -> String {
    line.split(' ')
        .map(|word| {
            let mut seen_letter = false;
            word.chars()
                .flat_map(|c| {
                    let upper = c.is_alphabetic() && !seen_letter;
                    seen_letter |= c.is_alphabetic();
                    if upper {
                        c.to_uppercase().collect::<Vec<_>>()
                    } else {
                        c.to_lowercase().collect::<Vec<_>>()
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}
