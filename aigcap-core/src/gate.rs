//! Write/edit gate predicates over header presence and review state.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::language_for_path;
use crate::extractor::BANNER;

/// Number of leading lines inspected after an edit.
pub const EDIT_HEAD_LINES: usize = 50;

/// Path fragments and file names that are never gated.
pub const SKIP_PATTERNS: &[&str] = &[
    "node_modules",
    ".git",
    "__pycache__",
    "target/debug",
    "target/release",
    "dist/",
    "build/",
    "package.json",
    "package-lock.json",
    "Cargo.lock",
    "yarn.lock",
    "Cargo.toml",
    "pyproject.toml",
    "go.mod",
    "go.sum",
    "tsconfig.json",
    ".eslintrc",
    ".prettierrc",
    "CLAUDE.md",
    "AIGCAP_PROTOCOL.md",
    "README.md",
    "CHANGELOG.md",
    "LICENSE",
    ".env",
    ".gitignore",
    ".dockerignore",
    "Makefile",
    "Dockerfile",
    "docker-compose",
    "__init__.py",
];

static REVIEWED_NO: LazyLock<Regex> = LazyLock::new(|| review_pattern("NO"));
static REVIEWED_YES: LazyLock<Regex> = LazyLock::new(|| review_pattern("YES"));

fn review_pattern(value: &str) -> Regex {
    let pattern = format!(r"(?i)REVIEWED-BY-HUMAN\s*:\s*{value}");
    match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("invalid review pattern {pattern:?}: {err}"),
    }
}

/// Whether the text carries the AIGCAP banner.
pub fn contains_banner(text: &str) -> bool {
    text.contains(BANNER)
}

/// Human review state recorded in a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    /// `REVIEWED-BY-HUMAN: NO` is present.
    Pending,
    /// Only `REVIEWED-BY-HUMAN: YES` is present.
    Approved,
    /// Neither marker is present.
    Missing,
}

/// Read the review marker from header text.
pub fn review_state(text: &str) -> ReviewState {
    if REVIEWED_NO.is_match(text) {
        ReviewState::Pending
    } else if REVIEWED_YES.is_match(text) {
        ReviewState::Approved
    } else {
        ReviewState::Missing
    }
}

/// Whether writes to `path` must carry a header.
pub fn is_gated_path(path: &Path) -> bool {
    let Some(language) = language_for_path(path) else {
        return false;
    };
    if !language.gated {
        return false;
    }
    let display = path.to_string_lossy().replace('\\', "/");
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    !SKIP_PATTERNS
        .iter()
        .any(|pattern| display.contains(pattern) || file_name == *pattern)
}

/// Why a write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The banner is missing.
    MissingHeader,
    /// The content claims a human review.
    ReviewedByTool,
    /// The review marker is missing.
    MissingReviewField,
}

impl BlockReason {
    /// Operator-facing explanation.
    pub fn message(self, path: &str) -> String {
        match self {
            Self::MissingHeader => format!(
                "AIGCAP BLOCKED: '{path}' is missing the AIGCAP header.\n\
                 Include the header at the top of the file, then retry the write."
            ),
            Self::ReviewedByTool => format!(
                "AIGCAP BLOCKED: '{path}' has REVIEWED-BY-HUMAN: YES.\n\
                 Generated content must always carry REVIEWED-BY-HUMAN: NO; only humans may set YES."
            ),
            Self::MissingReviewField => format!(
                "AIGCAP BLOCKED: '{path}' is missing REVIEWED-BY-HUMAN: NO.\n\
                 Add REVIEWED-BY-HUMAN: NO to the header, then retry the write."
            ),
        }
    }
}

/// Decision for content about to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// The write may proceed.
    Allow,
    /// The write must be refused.
    Block(BlockReason),
}

/// Check content before it is written.
pub fn check_write(content: &str) -> GateVerdict {
    if !contains_banner(content) {
        return GateVerdict::Block(BlockReason::MissingHeader);
    }
    if REVIEWED_YES.is_match(content) {
        return GateVerdict::Block(BlockReason::ReviewedByTool);
    }
    if !REVIEWED_NO.is_match(content) {
        return GateVerdict::Block(BlockReason::MissingReviewField);
    }
    GateVerdict::Allow
}

/// Advisory raised after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateWarning {
    /// The header disappeared.
    MissingHeader,
    /// The file still claims a human review after a tool edit.
    StillReviewed,
    /// The review marker is missing.
    MissingReviewField,
}

impl GateWarning {
    /// Operator-facing explanation.
    pub fn message(self, path: &str) -> String {
        match self {
            Self::MissingHeader => format!(
                "AIGCAP WARNING: '{path}' has no AIGCAP header after the edit.\n\
                 Add the AIGCAP header to the top of this file now."
            ),
            Self::StillReviewed => format!(
                "AIGCAP WARNING: '{path}' still has REVIEWED-BY-HUMAN: YES.\n\
                 The file was modified, so reset it to REVIEWED-BY-HUMAN: NO."
            ),
            Self::MissingReviewField => format!(
                "AIGCAP WARNING: '{path}' is missing the REVIEWED-BY-HUMAN field.\n\
                 Add REVIEWED-BY-HUMAN: NO to the AIGCAP header in this file."
            ),
        }
    }
}

/// Check the leading lines of a file after it was edited.
pub fn check_edited(content: &str) -> Option<GateWarning> {
    let head: String = content
        .lines()
        .take(EDIT_HEAD_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    if !contains_banner(&head) {
        return Some(GateWarning::MissingHeader);
    }
    match review_state(&head) {
        ReviewState::Pending => None,
        ReviewState::Approved => Some(GateWarning::StillReviewed),
        ReviewState::Missing => Some(GateWarning::MissingReviewField),
    }
}
