//! Renders annotations back into header comments.

use std::fmt::Write;

use crate::dialect::CommentDialect;
use crate::domain::{Annotation, CoverageClass, EntryKind};
use crate::extractor::{BANNER, SEPARATOR};

const RULE_WIDTH: usize = 5;

/// The `TYPE:` phrase for a classification, if it has one.
pub fn class_phrase(class: CoverageClass) -> Option<&'static str> {
    match class {
        CoverageClass::Whole => Some("WHOLE CODE IN THIS FILE"),
        CoverageClass::AboveHalf => Some("ABOVE 50% IN THIS FILE"),
        CoverageClass::BelowHalf => Some("DOWN 50% IN THIS FILE"),
        CoverageClass::Unknown => None,
    }
}

/// Render a complete header comment for `annotation` in `dialect`.
///
/// Entry names are expected to be identifiers; anything else will not parse
/// back.
pub fn write_header(annotation: &Annotation, dialect: CommentDialect) -> String {
    let rule = SEPARATOR.repeat(RULE_WIDTH);
    let mut body = vec![BANNER.to_string(), rule.clone()];

    if let Some(phrase) = class_phrase(annotation.class) {
        body.push(format!("TYPE: {phrase}"));
    }
    body.push("REVIEWED-BY-HUMAN: NO".to_string());

    for kind in EntryKind::ALL {
        let mut entries = annotation.entries_of(kind).peekable();
        if entries.peek().is_none() {
            continue;
        }
        body.push(kind.keyword().to_string());
        for entry in entries {
            let line = match entry.bounds() {
                Some((start, end)) => format!(
                    "- {start}~{end} LINE CODE IN THE {} `{}`",
                    kind.keyword(),
                    entry.name
                ),
                None => format!("- WHOLE CODE IN THE {} `{}`", kind.keyword(), entry.name),
            };
            body.push(line);
        }
    }

    if !annotation.libraries.is_empty() {
        body.push("IMPORTED".to_string());
        for library in &annotation.libraries {
            body.push(format!("- {}: {}", library.name, library.reason));
        }
    }
    body.push(rule);

    let mut output = String::new();
    if let Some(open) = dialect.open() {
        let _ = writeln!(output, "{open}");
    }
    for line in body {
        let _ = writeln!(output, "{}{line}", dialect.line_prefix());
    }
    if let Some(close) = dialect.close() {
        let _ = writeln!(output, "{close}");
    }
    output
}
