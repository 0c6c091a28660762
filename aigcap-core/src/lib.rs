#![deny(missing_docs)]
//! AIGCAP core library.
//!
//! Locates AI-generated code annotation headers in source files, parses
//! them into coverage facts, estimates AI-authored lines, and aggregates the
//! results for a whole tree.

pub mod dialect;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod extractor;
pub mod fs;
/// Write/edit gate predicates.
pub mod gate;
pub mod grammar;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod schema;
pub mod writer;

pub use dialect::{CommentDialect, Language, language_for_extension, language_for_path};
pub use domain::{
    Annotation, CoverageClass, CoverageEntry, EntryCoverage, EntryKind, FileRecord,
    LanguageStats, LibraryDeclaration, ProjectReport,
};
pub use error::{AigcapError, Result};
pub use estimator::{UnknownPolicy, estimate_ai_lines};
pub use extractor::{BANNER, HeaderBlock, SEPARATOR, extract_header};
pub use fs::{FileSystem, StdFileSystem};
pub use gate::{GateVerdict, GateWarning, check_edited, check_write, contains_banner, is_gated_path};
pub use parser::{parse_header, parse_text};
pub use report::{render_html, render_json, render_markdown};
pub use scanner::{
    DEFAULT_EXCLUDE, FileOutcome, ScanAccumulator, ScanConfig, Scanner, SourceFile,
    analyze_source,
};
pub use schema::{ReportSchema, render_schema};
pub use writer::write_header;
