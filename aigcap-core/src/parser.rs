//! Turns extracted header text into structured coverage facts.

use crate::domain::{Annotation, CoverageEntry};
use crate::extractor::HeaderBlock;
use crate::grammar::{self, Section};

/// Parse a header block. Never fails: unrecognized lines are skipped.
pub fn parse_header(header: &HeaderBlock) -> Annotation {
    parse_lines(header.lines())
}

/// Parse header text given as a single string.
pub fn parse_text(text: &str) -> Annotation {
    parse_lines(text.lines())
}

fn parse_lines<I>(lines: I) -> Annotation
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let lines: Vec<I::Item> = lines.into_iter().collect();
    let text = lines
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join("\n");

    let mut annotation = Annotation {
        class: grammar::classify(&text),
        ..Annotation::default()
    };
    let mut section = None;

    for line in &lines {
        let line = line.as_ref().trim();
        if let Some(next) = grammar::section_for(line) {
            section = Some(next);
            continue;
        }
        if !line.starts_with('-') {
            continue;
        }
        match section {
            Some(Section::Entries(kind)) => {
                let entry_text = line.trim_start_matches(['-', ' ']).trim();
                if let Some(entry) = grammar::match_entry(kind, entry_text) {
                    annotation.entries.push(entry);
                }
            }
            Some(Section::Libraries) => {
                if let Some(library) = grammar::match_library(line) {
                    annotation.libraries.push(library);
                }
            }
            None => {}
        }
    }

    annotation
}

/// Check partial-entry bounds against the file's line count.
///
/// Returns one message per problem; entries themselves are left untouched.
pub fn validate_bounds(entries: &[CoverageEntry], total_lines: usize) -> Vec<String> {
    let mut issues = Vec::new();
    for entry in entries {
        let Some((start, end)) = entry.bounds() else {
            continue;
        };
        if start == 0 {
            issues.push(format!("`{}` starts at line 0", entry.name));
        }
        if start > end {
            issues.push(format!(
                "`{}` has an inverted range {start}~{end}",
                entry.name
            ));
        }
        if end as usize > total_lines {
            issues.push(format!(
                "`{}` ends at line {end}, past the last line {total_lines}",
                entry.name
            ));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoverageClass, EntryKind, LibraryDeclaration};

    const HEADER: &str = "TYPE: ABOVE 50% IN THIS FILE
REVIEWED-BY-HUMAN: NO
METHOD
- WHOLE CODE IN THE METHOD `foo`
- 12~34 LINE CODE IN THE METHOD bar
- a note nobody can parse
STRUCT
- 12~34 LINE CODE IN THE STRUCT Bar
TRAIT
- WHOLE CODE IN THE TRAIT 'Render'
IMPORTED
- serde: serialization of reports
- regex: grammar";

    #[test]
    fn parses_sections_entries_and_libraries() {
        let annotation = parse_text(HEADER);
        assert_eq!(annotation.class, CoverageClass::AboveHalf);
        assert_eq!(
            annotation.entries,
            vec![
                CoverageEntry::whole(EntryKind::Unit, "foo"),
                CoverageEntry::partial(EntryKind::Unit, "bar", 12, 34),
                CoverageEntry::partial(EntryKind::Type, "Bar", 12, 34),
                CoverageEntry::whole(EntryKind::Contract, "Render"),
            ]
        );
        assert_eq!(
            annotation.libraries,
            vec![
                LibraryDeclaration {
                    name: "serde".to_string(),
                    reason: "serialization of reports".to_string(),
                },
                LibraryDeclaration {
                    name: "regex".to_string(),
                    reason: "grammar".to_string(),
                },
            ]
        );
    }

    #[test]
    fn whole_method_example() {
        let annotation = parse_text("METHOD\n- WHOLE CODE IN THE METHOD `foo`");
        assert_eq!(
            annotation.entries,
            vec![CoverageEntry::whole(EntryKind::Unit, "foo")]
        );
        assert_eq!(annotation.class, CoverageClass::Unknown);
    }

    #[test]
    fn entries_outside_a_section_are_ignored() {
        let annotation = parse_text("- WHOLE CODE IN THE METHOD foo\n- serde: json");
        assert!(annotation.entries.is_empty());
        assert!(annotation.libraries.is_empty());
    }

    #[test]
    fn entries_use_the_current_section_kind() {
        let annotation = parse_text("STRUCT\n- WHOLE CODE IN THE METHOD foo");
        assert!(annotation.entries.is_empty());
    }

    #[test]
    fn library_lines_in_entry_sections_are_not_libraries() {
        let annotation = parse_text("METHOD\n- serde: json\nIMPORTED\n- tokio: runtime");
        assert_eq!(annotation.libraries.len(), 1);
        assert_eq!(annotation.libraries[0].name, "tokio");
    }

    #[test]
    fn parse_header_reads_block_lines() {
        let block = crate::extractor::extract_from_lines([
            "THIS FILE INCLUDES AI GENERATED CODE",
            "========",
            "TYPE: WHOLE CODE IN THIS FILE",
            "OBJECT",
            "- WHOLE CODE IN THE OBJECT Point",
            "========",
        ])
        .expect("block");
        let annotation = parse_header(&block);
        assert_eq!(annotation.class, CoverageClass::Whole);
        assert_eq!(
            annotation.entries,
            vec![CoverageEntry::whole(EntryKind::Type, "Point")]
        );
    }

    #[test]
    fn validate_bounds_reports_each_problem() {
        let entries = vec![
            CoverageEntry::whole(EntryKind::Unit, "ok"),
            CoverageEntry::partial(EntryKind::Unit, "fine", 1, 10),
            CoverageEntry::partial(EntryKind::Unit, "inverted", 9, 3),
            CoverageEntry::partial(EntryKind::Type, "zero", 0, 2),
            CoverageEntry::partial(EntryKind::Contract, "long", 5, 500),
        ];
        let issues = validate_bounds(&entries, 100);
        assert_eq!(issues.len(), 3);
        assert!(issues[0].contains("inverted"));
        assert!(issues[1].contains("line 0"));
        assert!(issues[2].contains("past the last line 100"));
    }
}
