//! Line classification for pasted conversation transcripts.
//!
//! Each trimmed line is run through an ordered rule table; the first rule that
//! claims the line decides its kind, and unclaimed lines are content.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker term that makes a short line read as a section title.
pub const TITLE_MARKER: &str = "对话";

/// Title headers must be shorter than this many characters.
pub const TITLE_MAX_CHARS: usize = 30;

static DATE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})[.\-]([0-9]{1,2})[.\-]([0-9]{1,2})").expect("date prefix pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// Normalized `YYYY-MM-DD`
    DateHeader(String),
    TitleHeader(String),
    Content,
}

/// Checked in order; the first match wins.
const LINE_RULES: &[fn(&str) -> Option<LineKind>] = &[blank_line, date_header, title_header];

/// Classify one line. Leading and trailing whitespace is ignored.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    LINE_RULES
        .iter()
        .find_map(|rule| rule(trimmed))
        .unwrap_or(LineKind::Content)
}

/// Zero-padded `YYYY-MM-DD` for a line starting with a date like `2022.3.30`.
/// Anything after the date on the same line is ignored.
pub fn parse_date_prefix(line: &str) -> Option<String> {
    let caps = DATE_PREFIX.captures(line)?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    Some(format!("{}-{:02}-{:02}", &caps[1], month, day))
}

fn blank_line(line: &str) -> Option<LineKind> {
    line.is_empty().then_some(LineKind::Blank)
}

fn date_header(line: &str) -> Option<LineKind> {
    parse_date_prefix(line).map(LineKind::DateHeader)
}

fn title_header(line: &str) -> Option<LineKind> {
    let looks_like_title = line.contains(TITLE_MARKER)
        && !line.contains(':')
        && !line.contains('：')
        && line.chars().count() < TITLE_MAX_CHARS;
    looks_like_title.then(|| LineKind::TitleHeader(line.to_string()))
}
