//! Tree walk and per-language aggregation of AIGCAP headers.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::dialect::{Language, language_for_path};
use crate::domain::{FileRecord, LanguageStats, ProjectReport};
use crate::error::{AigcapError, Result};
use crate::estimator::{UnknownPolicy, estimate_ai_lines};
use crate::extractor::extract_header;
use crate::fs::FileSystem;
use crate::parser::{parse_header, validate_bounds};

/// Directory names never descended into.
pub const DEFAULT_EXCLUDE: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    "target",
    "build",
    "dist",
    ".next",
    ".nuxt",
    "vendor",
    ".venv",
    "venv",
    "env",
    ".env",
    ".idea",
    ".vscode",
    "coverage",
    ".coverage",
    "htmlcov",
];

/// Scanner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Directory names pruned from the walk.
    pub exclude: BTreeSet<String>,
    /// Estimation policy for headers without a classification.
    pub unknown_policy: UnknownPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDE.iter().map(|name| name.to_string()).collect(),
            unknown_policy: UnknownPolicy::default(),
        }
    }
}

impl ScanConfig {
    /// Add extra directory names to the exclusion set.
    pub fn with_extra_excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude.extend(
            names
                .into_iter()
                .map(|name| name.as_ref().trim().to_string())
                .filter(|name| !name.is_empty()),
        );
        self
    }

    /// Set the estimation policy for unclassified headers.
    pub fn with_unknown_policy(mut self, policy: UnknownPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }
}

/// A recognized file discovered under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute or root-joined path used for reading.
    pub path: PathBuf,
    /// Path relative to the scan root.
    pub relative: String,
    /// Language resolved from the extension.
    pub language: &'static Language,
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file carries a header.
    Annotated(FileRecord),
    /// The file has no usable header.
    Unannotated {
        /// Path relative to the scan root.
        path: String,
        /// Language name.
        language: String,
        /// Non-blank line count.
        total_lines: usize,
    },
}

/// Number of lines with visible content.
pub fn count_lines(content: &str) -> usize {
    content.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Run extraction, parsing and estimation for one file's content.
pub fn analyze_source(source: &SourceFile, content: &str, policy: UnknownPolicy) -> FileOutcome {
    let total_lines = count_lines(content);
    let Some(header) = extract_header(content, source.language.dialect) else {
        return FileOutcome::Unannotated {
            path: source.relative.clone(),
            language: source.language.name.to_string(),
            total_lines,
        };
    };

    let annotation = parse_header(&header);
    let estimated_ai_lines =
        estimate_ai_lines(total_lines, annotation.class, &annotation.entries, policy);
    let issues = validate_bounds(&annotation.entries, total_lines);
    for issue in &issues {
        warn!("{}: {issue}", source.relative);
    }

    FileOutcome::Annotated(FileRecord {
        path: source.relative.clone(),
        language: source.language.name.to_string(),
        class: annotation.class,
        entries: annotation.entries,
        libraries: annotation.libraries,
        total_lines,
        estimated_ai_lines,
        issues,
    })
}

/// Single owner of the project-wide counters while a scan is in progress.
#[derive(Debug, Clone)]
pub struct ScanAccumulator {
    scan_directory: String,
    files: Vec<FileRecord>,
    files_without_annotation: Vec<String>,
    language_breakdown: BTreeMap<String, LanguageStats>,
}

impl ScanAccumulator {
    /// Start accumulating for the given root.
    pub fn new(root: &Path) -> Self {
        let scan_directory = std::path::absolute(root)
            .unwrap_or_else(|_| root.to_path_buf())
            .display()
            .to_string();
        Self {
            scan_directory,
            files: Vec::new(),
            files_without_annotation: Vec::new(),
            language_breakdown: BTreeMap::new(),
        }
    }

    /// Fold one fully computed file outcome into the totals.
    pub fn absorb(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Annotated(record) => {
                let stats = self
                    .language_breakdown
                    .entry(record.language.clone())
                    .or_default();
                stats.files_total += 1;
                stats.files_with_annotation += 1;
                stats.ai_lines += record.estimated_ai_lines;
                stats.total_lines += record.total_lines;
                self.files.push(record);
            }
            FileOutcome::Unannotated {
                path,
                language,
                total_lines,
            } => {
                let stats = self.language_breakdown.entry(language).or_default();
                stats.files_total += 1;
                stats.total_lines += total_lines;
                self.files_without_annotation.push(path);
            }
        }
    }

    /// Finish the scan, sorting lists by path and stamping the time.
    pub fn finish(self) -> ProjectReport {
        self.finish_at(chrono::Utc::now().to_rfc3339())
    }

    /// Finish the scan with an explicit timestamp.
    pub fn finish_at(mut self, scan_time: String) -> ProjectReport {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        self.files_without_annotation.sort();
        let with = self.files.len();
        let without = self.files_without_annotation.len();
        ProjectReport {
            scan_directory: self.scan_directory,
            scan_time,
            total_files_scanned: with + without,
            total_files_with_annotation: with,
            total_files_without_annotation: without,
            files: self.files,
            files_without_annotation: self.files_without_annotation,
            language_breakdown: self.language_breakdown,
        }
    }
}

/// Walks a tree and aggregates AIGCAP coverage.
pub struct Scanner<F: FileSystem> {
    fs: F,
    config: ScanConfig,
}

impl<F: FileSystem> Scanner<F> {
    /// Create a scanner with the default configuration.
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            config: ScanConfig::default(),
        }
    }

    /// Create a scanner with a custom configuration.
    pub fn with_config(fs: F, config: ScanConfig) -> Self {
        Self { fs, config }
    }

    /// List recognized files under `root`. Fails only for an invalid root.
    pub fn discover(&self, root: &Path) -> Result<Vec<SourceFile>> {
        if !self.fs.is_dir(root) {
            return Err(AigcapError::InvalidRoot(root.to_path_buf()));
        }
        let files = self.fs.list_files(root, &self.config.exclude)?;
        let sources = files
            .into_iter()
            .filter_map(|path| {
                let language = language_for_path(&path)?;
                if has_excluded_segment(root, &path, &self.config.exclude) {
                    return None;
                }
                let relative = relative_path(root, &path);
                Some(SourceFile {
                    path,
                    relative,
                    language,
                })
            })
            .collect();
        Ok(sources)
    }

    /// Scan `root` and build the project report.
    pub fn scan(&self, root: &Path) -> Result<ProjectReport> {
        let sources = self.discover(root)?;
        info!("scanning {} recognized files under {}", sources.len(), root.display());

        let mut accumulator = ScanAccumulator::new(root);
        for source in &sources {
            let content = match self.fs.read_to_string(&source.path) {
                Ok(content) => content,
                Err(err) => {
                    warn!("skipping unreadable file {}: {err}", source.relative);
                    continue;
                }
            };
            let outcome = analyze_source(source, &content, self.config.unknown_policy);
            debug!("{}: {}", source.relative, describe_outcome(&outcome));
            accumulator.absorb(outcome);
        }

        let report = accumulator.finish();
        info!(
            "scanned {} files, {} with headers",
            report.total_files_scanned, report.total_files_with_annotation
        );
        Ok(report)
    }
}

/// One-line summary of an outcome for logs.
pub fn describe_outcome(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Annotated(record) => format!(
            "{} header, {}/{} AI lines",
            record.class.label(),
            record.estimated_ai_lines,
            record.total_lines
        ),
        FileOutcome::Unannotated { total_lines, .. } => {
            format!("no header, {total_lines} lines")
        }
    }
}

/// Path of `path` relative to `root`, with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// Guards filesystems that list files without pruning.
fn has_excluded_segment(root: &Path, path: &Path, exclude: &BTreeSet<String>) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let Some(parent) = relative.parent() else {
        return false;
    };
    parent.components().any(|component| {
        exclude.contains(component.as_os_str().to_string_lossy().as_ref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CoverageClass;
    use crate::error::AigcapError;
    use crate::fs::MockFileSystem;
    use std::path::{Path, PathBuf};

    const WHOLE_RS: &str = "/*
 * THIS FILE INCLUDES AI GENERATED CODE
 * ========
 * TYPE: WHOLE CODE IN THIS FILE
 * REVIEWED-BY-HUMAN: NO
 * ========
 */
fn main() {}
";

    const PARTIAL_PY: &str = "# THIS FILE INCLUDES AI GENERATED CODE
# ========
# TYPE: DOWN 50% IN THIS FILE
# METHOD
# - 3~12 LINE CODE IN THE METHOD load
# IMPORTED
# - requests: http client
# ========

def load():
    pass
";

    fn mock_tree(files: Vec<(&'static str, &'static str)>) -> MockFileSystem {
        let mut fs = MockFileSystem::new();
        fs.expect_is_dir().returning(|_| true);
        let paths: Vec<PathBuf> = files
            .iter()
            .map(|(path, _)| Path::new("/repo").join(path))
            .collect();
        fs.expect_list_files()
            .returning(move |_, _| Ok(paths.clone()));
        fs.expect_read_to_string().returning(move |path| {
            files
                .iter()
                .find(|(rel, _)| Path::new("/repo").join(rel) == path)
                .map(|(_, contents)| contents.to_string())
                .ok_or_else(|| AigcapError::Other(format!("no such file {}", path.display())))
        });
        fs
    }

    #[test]
    fn scan_aggregates_per_language_counters() {
        let fs = mock_tree(vec![
            ("src/main.rs", WHOLE_RS),
            ("src/lib.rs", "pub fn lib() {}\n\n"),
            ("tools/load.py", PARTIAL_PY),
            ("README.md", "# readme\n"),
        ]);

        let report = Scanner::new(fs).scan(Path::new("/repo")).expect("scan");

        assert_eq!(report.total_files_scanned, 3);
        assert_eq!(report.total_files_with_annotation, 2);
        assert_eq!(report.total_files_without_annotation, 1);
        assert_eq!(report.files_without_annotation, vec!["src/lib.rs"]);

        let rust = &report.language_breakdown["Rust"];
        assert_eq!(rust.files_total, 2);
        assert_eq!(rust.files_with_annotation, 1);
        assert_eq!(rust.total_lines, 8 + 1);
        assert_eq!(rust.ai_lines, 8);

        let python = &report.language_breakdown["Python"];
        assert_eq!(python.files_total, 1);
        assert_eq!(python.ai_lines, 10);

        let paths: Vec<_> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/main.rs", "tools/load.py"]);
        assert_eq!(report.files[0].class, CoverageClass::Whole);
        assert_eq!(report.files[1].libraries[0].name, "requests");
    }

    #[test]
    fn unreadable_files_are_not_counted() {
        let mut fs = MockFileSystem::new();
        fs.expect_is_dir().returning(|_| true);
        fs.expect_list_files()
            .returning(|_, _| Ok(vec![PathBuf::from("/repo/a.rs"), PathBuf::from("/repo/b.rs")]));
        fs.expect_read_to_string()
            .withf(|path| path == Path::new("/repo/a.rs"))
            .returning(|_| Err(AigcapError::Other("permission denied".to_string())));
        fs.expect_read_to_string()
            .withf(|path| path == Path::new("/repo/b.rs"))
            .returning(|_| Ok("fn b() {}\n".to_string()));

        let report = Scanner::new(fs).scan(Path::new("/repo")).expect("scan");

        assert_eq!(report.total_files_scanned, 1);
        assert_eq!(report.language_breakdown["Rust"].files_total, 1);
        assert_eq!(report.files_without_annotation, vec!["b.rs"]);
    }

    #[test]
    fn invalid_root_is_rejected_before_listing() {
        let mut fs = MockFileSystem::new();
        fs.expect_is_dir().returning(|_| false);
        fs.expect_list_files().never();

        let error = Scanner::new(fs)
            .scan(Path::new("/missing"))
            .expect_err("invalid root");
        assert!(matches!(error, AigcapError::InvalidRoot(_)));
    }

    #[test]
    fn excluded_segments_are_dropped_even_if_listed() {
        let fs = mock_tree(vec![
            ("node_modules/pkg/index.js", WHOLE_RS),
            ("src/app.js", "let a = 1;\n"),
        ]);
        let report = Scanner::new(fs).scan(Path::new("/repo")).expect("scan");
        assert_eq!(report.total_files_scanned, 1);
        assert_eq!(report.files_without_annotation, vec!["src/app.js"]);
    }

    #[test]
    fn extra_excludes_are_unioned_with_defaults() {
        let config = ScanConfig::default().with_extra_excludes(["generated", " ", " docs "]);
        assert!(config.exclude.contains("generated"));
        assert!(config.exclude.contains("docs"));
        assert!(config.exclude.contains("node_modules"));
        assert!(!config.exclude.contains(""));
    }

    #[test]
    fn unknown_classification_is_stored_but_estimated_by_policy() {
        let source = SourceFile {
            path: PathBuf::from("/repo/q.sql"),
            relative: "q.sql".to_string(),
            language: crate::dialect::language_for_extension("sql").expect("sql"),
        };
        let content = "-- THIS FILE INCLUDES AI GENERATED CODE
-- ========
-- REVIEWED-BY-HUMAN: NO
-- ========
SELECT 1;
SELECT 2;
SELECT 3;
SELECT 4;
";
        let FileOutcome::Annotated(record) =
            analyze_source(&source, content, UnknownPolicy::AssumeBelowHalf)
        else {
            panic!("expected a header");
        };
        assert_eq!(record.class, CoverageClass::Unknown);
        assert_eq!(record.total_lines, 8);
        assert_eq!(record.estimated_ai_lines, 2);

        let FileOutcome::Annotated(record) = analyze_source(&source, content, UnknownPolicy::Zero)
        else {
            panic!("expected a header");
        };
        assert_eq!(record.estimated_ai_lines, 0);
    }

    #[test]
    fn bounds_issues_are_recorded_on_the_file() {
        let source = SourceFile {
            path: PathBuf::from("/repo/x.py"),
            relative: "x.py".to_string(),
            language: crate::dialect::language_for_extension("py").expect("py"),
        };
        let content = "# THIS FILE INCLUDES AI GENERATED CODE
# ========
# TYPE: ABOVE 50% IN THIS FILE
# METHOD
# - 40~4 LINE CODE IN THE METHOD backwards
# ========
x = 1
";
        let outcome = analyze_source(&source, content, UnknownPolicy::default());
        let FileOutcome::Annotated(record) = outcome else {
            panic!("expected a header");
        };
        assert_eq!(record.issues.len(), 1);
        assert!(record.issues[0].contains("backwards"));
        assert_eq!(record.estimated_ai_lines, 7 * 75 / 100);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        assert_eq!(
            relative_path(Path::new("/repo"), Path::new("/repo/src/a/b.rs")),
            "src/a/b.rs"
        );
        assert_eq!(relative_path(Path::new("/other"), Path::new("x.rs")), "x.rs");
    }

    #[test]
    fn count_lines_skips_blank_lines() {
        assert_eq!(count_lines("a\n\n  \n\tb\n"), 2);
        assert_eq!(count_lines(""), 0);
    }
}
