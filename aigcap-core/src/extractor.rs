//! Locates the AIGCAP header block inside a file's leading comment.

use crate::dialect::CommentDialect;

/// Literal phrase announcing that a file carries an AIGCAP header.
pub const BANNER: &str = "THIS FILE INCLUDES AI GENERATED CODE";

/// Rule that opens and closes the header block.
pub const SEPARATOR: &str = "========";

/// Header text isolated from a file, one stripped line per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    lines: Vec<String>,
}

impl HeaderBlock {
    /// Content lines in file order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Searching,
    Collecting,
    Done,
}

/// Extract the header block from raw file content.
///
/// Returns `None` when the banner never appears, or when the block is not
/// closed by a second separator after at least one content line.
pub fn extract_header(content: &str, dialect: CommentDialect) -> Option<HeaderBlock> {
    extract_from_lines(content.lines().map(|line| dialect.strip(line)))
}

/// Run the extraction state machine over already-stripped lines.
pub fn extract_from_lines<I>(lines: I) -> Option<HeaderBlock>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut state = State::Searching;
    let mut banner_seen = false;
    let mut collected = Vec::new();
    let mut lines = lines.into_iter();

    for line in lines.by_ref() {
        let line = line.as_ref();
        if state == State::Searching && line.contains(SEPARATOR) {
            state = State::Collecting;
            // The opening rule may share its line with the banner.
            banner_seen |= line.contains(BANNER);
            continue;
        }
        if line.contains(BANNER) {
            banner_seen = true;
            continue;
        }
        if state != State::Collecting {
            continue;
        }
        if line.contains(SEPARATOR) {
            if collected.is_empty() {
                continue;
            }
            state = State::Done;
            break;
        }
        collected.push(line.to_string());
    }

    if state == State::Done && !banner_seen {
        banner_seen = lines.any(|line| line.as_ref().contains(BANNER));
    }

    if state == State::Done && banner_seen {
        Some(HeaderBlock { lines: collected })
    } else {
        None
    }
}
