//! Domain entities for AIGCAP coverage reports.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// File-wide declared coverage bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageClass {
    /// The whole file was AI-authored.
    Whole,
    /// More than half of the file was AI-authored.
    #[serde(rename = "ABOVE_50")]
    AboveHalf,
    /// Less than half of the file was AI-authored.
    #[serde(rename = "DOWN_50")]
    BelowHalf,
    /// The header carried no recognizable `TYPE:` declaration.
    Unknown,
}

impl CoverageClass {
    /// Short label used by formatters.
    pub fn label(self) -> &'static str {
        match self {
            Self::Whole => "WHOLE",
            Self::AboveHalf => ">50%",
            Self::BelowHalf => "<50%",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// What kind of definition a coverage entry points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A function or method.
    Unit,
    /// A struct, class or object definition.
    Type,
    /// A trait or interface definition.
    Contract,
}

impl EntryKind {
    /// All entry kinds in header order.
    pub const ALL: [EntryKind; 3] = [Self::Unit, Self::Type, Self::Contract];

    /// Keyword written in section headers and entry lines.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Unit => "METHOD",
            Self::Type => "STRUCT",
            Self::Contract => "TRAIT",
        }
    }

    /// Alternate keyword accepted wherever [`EntryKind::keyword`] is.
    pub fn synonym(self) -> &'static str {
        match self {
            Self::Unit => "FUNCTION",
            Self::Type => "OBJECT",
            Self::Contract => "INTERFACE",
        }
    }
}

/// How much of a single definition was AI-authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryCoverage {
    /// The whole definition.
    Whole,
    /// An explicit line range.
    Partial,
}

/// One declared fact about a callable unit, type or contract definition.
///
/// Line bounds are present only for [`EntryCoverage::Partial`] entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEntry {
    /// Identifier of the definition.
    pub name: String,
    /// Kind of definition.
    pub kind: EntryKind,
    /// Declared coverage.
    pub coverage: EntryCoverage,
    /// First AI-authored line of a partial entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    /// Last AI-authored line of a partial entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

impl CoverageEntry {
    /// Entry covering a whole definition.
    pub fn whole(kind: EntryKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            coverage: EntryCoverage::Whole,
            start_line: None,
            end_line: None,
        }
    }

    /// Entry covering an explicit line range.
    pub fn partial(
        kind: EntryKind,
        name: impl Into<String>,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            coverage: EntryCoverage::Partial,
            start_line: Some(start_line),
            end_line: Some(end_line),
        }
    }

    /// Line bounds of a partial entry.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        match (self.coverage, self.start_line, self.end_line) {
            (EntryCoverage::Partial, Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Number of lines covered by a partial entry; inverted ranges count as zero.
    pub fn span(&self) -> Option<usize> {
        self.bounds().map(|(start, end)| {
            if end >= start {
                (end - start) as usize + 1
            } else {
                0
            }
        })
    }

    /// Human-readable description of the coverage.
    pub fn describe(&self) -> String {
        match self.bounds() {
            Some((start, end)) => format!("AI wrote lines {start}~{end}"),
            None => "AI wrote entire code".to_string(),
        }
    }
}

/// An external library the AI selected, with its stated reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LibraryDeclaration {
    /// Library name.
    pub name: String,
    /// Free-text reason for choosing it.
    pub reason: String,
}

/// Structured facts parsed from one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Declared file-wide classification.
    pub class: CoverageClass,
    /// Coverage entries in header order.
    pub entries: Vec<CoverageEntry>,
    /// Library declarations in header order.
    pub libraries: Vec<LibraryDeclaration>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            class: CoverageClass::Unknown,
            entries: Vec::new(),
            libraries: Vec::new(),
        }
    }
}

impl Annotation {
    /// Entries of the given kind, in header order.
    pub fn entries_of(&self, kind: EntryKind) -> impl Iterator<Item = &CoverageEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }
}

/// Per-file outcome for a file carrying a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Path relative to the scan root.
    pub path: String,
    /// Detected language name.
    pub language: String,
    /// Declared classification.
    pub class: CoverageClass,
    /// Coverage entries across all kinds.
    pub entries: Vec<CoverageEntry>,
    /// Library declarations.
    pub libraries: Vec<LibraryDeclaration>,
    /// Non-blank line count.
    pub total_lines: usize,
    /// Estimated AI-authored line count, never above `total_lines`.
    pub estimated_ai_lines: usize,
    /// Problems found while validating entry bounds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl FileRecord {
    /// Estimated share of AI-authored lines, as a percentage.
    pub fn ai_percent(&self) -> f64 {
        percent(self.estimated_ai_lines, self.total_lines)
    }
}

/// Counters for a single language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStats {
    /// Files of this language that were scanned.
    pub files_total: usize,
    /// Files of this language carrying a header.
    pub files_with_annotation: usize,
    /// Estimated AI-authored lines.
    pub ai_lines: usize,
    /// Non-blank lines across all scanned files.
    pub total_lines: usize,
}

impl LanguageStats {
    /// Files of this language without a header.
    pub fn files_without_annotation(&self) -> usize {
        self.files_total - self.files_with_annotation
    }
}

/// Counts of annotated files per declared classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    /// Files declared as whole.
    pub whole: usize,
    /// Files declared above half.
    pub above_half: usize,
    /// Files declared below half.
    pub below_half: usize,
    /// Files with no classification.
    pub unknown: usize,
}

/// A library deduplicated across files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySummary {
    /// Every distinct reason given.
    pub reasons: BTreeSet<String>,
    /// Files declaring the library, in report order.
    pub files: Vec<String>,
}

/// Project-wide aggregate handed to the formatters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    /// Absolute scan root.
    pub scan_directory: String,
    /// RFC 3339 scan timestamp.
    pub scan_time: String,
    /// Recognized files that were scanned.
    pub total_files_scanned: usize,
    /// Scanned files carrying a header.
    pub total_files_with_annotation: usize,
    /// Scanned files without a header.
    pub total_files_without_annotation: usize,
    /// Per-file records, sorted by path.
    pub files: Vec<FileRecord>,
    /// Paths of files without a header, sorted.
    pub files_without_annotation: Vec<String>,
    /// Statistics keyed by language name.
    pub language_breakdown: BTreeMap<String, LanguageStats>,
}

impl ProjectReport {
    /// Estimated AI-authored lines across the project.
    pub fn total_ai_lines(&self) -> usize {
        self.files.iter().map(|file| file.estimated_ai_lines).sum()
    }

    /// Non-blank lines across every scanned file.
    pub fn total_lines(&self) -> usize {
        self.language_breakdown
            .values()
            .map(|stats| stats.total_lines)
            .sum()
    }

    /// Project-wide AI coverage percentage.
    pub fn coverage_percent(&self) -> f64 {
        percent(self.total_ai_lines(), self.total_lines())
    }

    /// Share of scanned files carrying a header, as a percentage.
    pub fn annotated_percent(&self) -> f64 {
        percent(self.total_files_with_annotation, self.total_files_scanned)
    }

    /// Number of annotated files per classification.
    pub fn class_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for file in &self.files {
            match file.class {
                CoverageClass::Whole => counts.whole += 1,
                CoverageClass::AboveHalf => counts.above_half += 1,
                CoverageClass::BelowHalf => counts.below_half += 1,
                CoverageClass::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    /// Libraries deduplicated by name with their reasons unioned.
    pub fn library_summary(&self) -> BTreeMap<String, LibrarySummary> {
        let mut summary: BTreeMap<String, LibrarySummary> = BTreeMap::new();
        for file in &self.files {
            for library in &file.libraries {
                let entry = summary.entry(library.name.clone()).or_default();
                entry.reasons.insert(library.reason.clone());
                if entry.files.last() != Some(&file.path) {
                    entry.files.push(file.path.clone());
                }
            }
        }
        summary
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
