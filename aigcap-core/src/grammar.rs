//! Pattern table for the AIGCAP header grammar.
//!
//! Every rule the parser applies lives here, one row per rule, so the
//! grammar can be read and tested without the traversal around it.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::{CoverageClass, CoverageEntry, EntryCoverage, EntryKind, LibraryDeclaration};

/// Header section selected by a line-initial keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Coverage entries of one kind.
    Entries(EntryKind),
    /// Library declarations.
    Libraries,
}

/// Line-initial keywords that switch the current section. Case-sensitive.
pub const SECTION_HEADERS: &[(&str, Section)] = &[
    ("METHOD", Section::Entries(EntryKind::Unit)),
    ("FUNCTION", Section::Entries(EntryKind::Unit)),
    ("STRUCT", Section::Entries(EntryKind::Type)),
    ("OBJECT", Section::Entries(EntryKind::Type)),
    ("TRAIT", Section::Entries(EntryKind::Contract)),
    ("INTERFACE", Section::Entries(EntryKind::Contract)),
    ("IMPORTED", Section::Libraries),
];

/// Section selected by a trimmed header line, if it starts with a keyword.
pub fn section_for(line: &str) -> Option<Section> {
    SECTION_HEADERS
        .iter()
        .find(|(keyword, _)| line.starts_with(keyword))
        .map(|(_, section)| *section)
}

/// One row of the classification table.
pub struct ClassRule {
    /// Classification produced on a match.
    pub class: CoverageClass,
    /// Phrase pattern following `TYPE:`.
    pub phrase: &'static str,
}

/// Classification phrases in priority order.
pub const CLASS_RULES: &[ClassRule] = &[
    ClassRule {
        class: CoverageClass::Whole,
        phrase: r"WHOLE\s+CODE\s+IN\s+THIS\s+FILE",
    },
    ClassRule {
        class: CoverageClass::AboveHalf,
        phrase: r"ABOVE\s+50%?\s+IN\s+THIS\s+FILE",
    },
    ClassRule {
        class: CoverageClass::BelowHalf,
        phrase: r"DOWN\s+50%?\s+IN\s+THIS\s+FILE",
    },
];

static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = CLASS_RULES
        .iter()
        .map(|rule| format!("({})", rule.phrase))
        .collect();
    compile(&format!(r"(?i)TYPE:\s*(?:{})", alternatives.join("|")))
});

/// Classification declared in the header text; the leftmost declaration wins.
pub fn classify(text: &str) -> CoverageClass {
    CLASS_PATTERN
        .captures(text)
        .and_then(|captures| {
            CLASS_RULES
                .iter()
                .enumerate()
                .find(|(index, _)| captures.get(index + 1).is_some())
                .map(|(_, rule)| rule.class)
        })
        .unwrap_or(CoverageClass::Unknown)
}

/// One row of the entry table: which kind and coverage a pattern yields.
pub struct EntryRule {
    /// Kind of entry the rule applies to.
    pub kind: EntryKind,
    /// Coverage produced on a match.
    pub coverage: EntryCoverage,
    /// Compiled pattern with `name` and, for partial rules, `start`/`end` groups.
    pub pattern: Regex,
}

const NAME: &str = r#"[`'"]?(?P<name>\w+)[`'"]?"#;

static ENTRY_RULES: LazyLock<Vec<EntryRule>> = LazyLock::new(|| {
    let mut rules = Vec::new();
    for kind in EntryKind::ALL {
        let kind_word = format!("(?:{}|{})", kind.keyword(), kind.synonym());
        rules.push(EntryRule {
            kind,
            coverage: EntryCoverage::Whole,
            pattern: compile(&format!(
                r"(?i)WHOLE\s+CODE\s+IN\s+THE\s+{kind_word}\s+{NAME}"
            )),
        });
        rules.push(EntryRule {
            kind,
            coverage: EntryCoverage::Partial,
            pattern: compile(&format!(
                r"(?i)(?P<start>\d+)\s*~\s*(?P<end>\d+)\s+LINE\s+CODE\s+IN\s+THE\s+{kind_word}\s+{NAME}"
            )),
        });
    }
    rules
});

/// The full entry table, whole rules before partial rules for each kind.
pub fn entry_rules() -> &'static [EntryRule] {
    &ENTRY_RULES
}

/// Match an entry line (list marker already removed) against the rules for `kind`.
pub fn match_entry(kind: EntryKind, text: &str) -> Option<CoverageEntry> {
    entry_rules()
        .iter()
        .filter(|rule| rule.kind == kind)
        .find_map(|rule| rule.pattern.captures(text).and_then(|captures| rule.build(&captures)))
}

impl EntryRule {
    fn build(&self, captures: &Captures<'_>) -> Option<CoverageEntry> {
        let name = captures.name("name")?.as_str();
        match self.coverage {
            EntryCoverage::Whole => Some(CoverageEntry::whole(self.kind, name)),
            EntryCoverage::Partial => {
                let start = parse_bound(captures.name("start")?.as_str());
                let end = parse_bound(captures.name("end")?.as_str());
                Some(CoverageEntry::partial(self.kind, name, start, end))
            }
        }
    }
}

// Bounds are digit runs; anything too large saturates and is clamped by the estimate.
fn parse_bound(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

static LIBRARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^-\s*(?P<name>\S+?):\s*(?P<reason>.+)$"));

/// Match a library line, list marker included.
pub fn match_library(line: &str) -> Option<LibraryDeclaration> {
    let captures = LIBRARY_PATTERN.captures(line)?;
    let name = captures["name"].trim_matches(|c| matches!(c, '`' | '\'' | '"'));
    if name.is_empty() {
        return None;
    }
    Some(LibraryDeclaration {
        name: name.to_string(),
        reason: captures["reason"].trim().to_string(),
    })
}

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("invalid built-in grammar pattern {pattern:?}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_phrases_map_to_classes() {
        assert_eq!(classify("TYPE: WHOLE CODE IN THIS FILE"), CoverageClass::Whole);
        assert_eq!(classify("type: above 50% in this file"), CoverageClass::AboveHalf);
        assert_eq!(classify("TYPE:DOWN 50 IN THIS FILE"), CoverageClass::BelowHalf);
        assert_eq!(classify("TYPE: SOMETHING ELSE"), CoverageClass::Unknown);
        assert_eq!(classify("WHOLE CODE IN THIS FILE"), CoverageClass::Unknown);
    }

    #[test]
    fn first_declaration_wins() {
        let text = "TYPE: DOWN 50% IN THIS FILE\nTYPE: WHOLE CODE IN THIS FILE";
        assert_eq!(classify(text), CoverageClass::BelowHalf);
    }

    #[test]
    fn section_keywords_are_line_initial_and_case_sensitive() {
        assert_eq!(section_for("METHOD"), Some(Section::Entries(EntryKind::Unit)));
        assert_eq!(section_for("FUNCTIONS:"), Some(Section::Entries(EntryKind::Unit)));
        assert_eq!(section_for("OBJECT"), Some(Section::Entries(EntryKind::Type)));
        assert_eq!(section_for("INTERFACE"), Some(Section::Entries(EntryKind::Contract)));
        assert_eq!(section_for("IMPORTED LIBRARIES"), Some(Section::Libraries));
        assert_eq!(section_for("method"), None);
        assert_eq!(section_for("- METHOD"), None);
    }

    #[test]
    fn whole_entries_accept_any_quoting() {
        for text in [
            "WHOLE CODE IN THE METHOD `foo`",
            "whole code in the method 'foo'",
            "WHOLE CODE IN THE FUNCTION \"foo\"",
            "WHOLE  CODE IN THE METHOD foo",
        ] {
            let entry = match_entry(EntryKind::Unit, text).expect(text);
            assert_eq!(entry, CoverageEntry::whole(EntryKind::Unit, "foo"));
        }
    }

    #[test]
    fn partial_entries_capture_bounds() {
        let entry = match_entry(EntryKind::Type, "12~34 LINE CODE IN THE STRUCT Bar").expect("entry");
        assert_eq!(entry, CoverageEntry::partial(EntryKind::Type, "Bar", 12, 34));

        let entry =
            match_entry(EntryKind::Contract, "3 ~ 9 line code in the interface `Shape`").expect("entry");
        assert_eq!(entry, CoverageEntry::partial(EntryKind::Contract, "Shape", 3, 9));
    }

    #[test]
    fn rules_only_match_their_own_kind() {
        assert!(match_entry(EntryKind::Unit, "WHOLE CODE IN THE STRUCT Bar").is_none());
        assert!(match_entry(EntryKind::Type, "1~2 LINE CODE IN THE TRAIT Bar").is_none());
        assert!(match_entry(EntryKind::Unit, "something unrelated").is_none());
    }

    #[test]
    fn oversized_bounds_saturate() {
        let entry =
            match_entry(EntryKind::Unit, "1~5000000000 LINE CODE IN THE METHOD big").expect("entry");
        assert_eq!(entry, CoverageEntry::partial(EntryKind::Unit, "big", 1, u32::MAX));

        let total = 100;
        let estimate = crate::estimator::estimate_ai_lines(
            total,
            CoverageClass::AboveHalf,
            &[entry],
            crate::estimator::UnknownPolicy::default(),
        );
        assert_eq!(estimate, total);
    }

    #[test]
    fn table_has_whole_and_partial_rule_per_kind() {
        assert_eq!(entry_rules().len(), 6);
        for kind in EntryKind::ALL {
            let coverages: Vec<_> = entry_rules()
                .iter()
                .filter(|rule| rule.kind == kind)
                .map(|rule| rule.coverage)
                .collect();
            assert_eq!(coverages, vec![EntryCoverage::Whole, EntryCoverage::Partial]);
        }
    }

    #[test]
    fn library_lines_split_name_and_reason() {
        let library = match_library("- serde: derive-based serialization").expect("library");
        assert_eq!(library.name, "serde");
        assert_eq!(library.reason, "derive-based serialization");

        let library = match_library("- `regex`:   header grammar ").expect("library");
        assert_eq!(library.name, "regex");
        assert_eq!(library.reason, "header grammar");

        assert!(match_library("- no reason given").is_none());
        assert!(match_library("serde: missing marker").is_none());
    }
}
