//! Comment dialects and the extension registry.

use std::path::Path;

/// The comment syntax family a source file uses for its leading header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentDialect {
    /// `/* ... */` with ` * ` continuation lines.
    Block,
    /// `#` line comments.
    Hash,
    /// `--` line comments.
    Dash,
    /// `<!-- ... -->` markup comments.
    Markup,
}

impl CommentDialect {
    /// Remove this dialect's comment decoration from a raw line.
    ///
    /// Stripping is best effort: decoration that does not match is left in
    /// place, and the result is always trimmed.
    pub fn strip(self, line: &str) -> String {
        let line = line.trim();
        let stripped = match self {
            Self::Block => {
                let line = strip_leading_run(line, "/*");
                let line = line.strip_suffix("*/").map_or(line, |rest| {
                    rest.trim_end_matches('*')
                });
                strip_leading_run(line, "*")
            }
            Self::Hash => strip_leading_run(line, "#"),
            Self::Dash => {
                if line.starts_with("--") {
                    strip_leading_run(line, "-")
                } else {
                    line
                }
            }
            Self::Markup => {
                let line = line
                    .strip_prefix("<!--")
                    .map_or(line, |rest| rest.strip_prefix(' ').unwrap_or(rest));
                line.strip_suffix("-->").map_or(line, |rest| {
                    rest.strip_suffix(' ').unwrap_or(rest)
                })
            }
        };
        stripped.trim().to_string()
    }

    /// Opening line for a header written in this dialect, if it needs one.
    pub fn open(self) -> Option<&'static str> {
        match self {
            Self::Block => Some("/*"),
            Self::Markup => Some("<!--"),
            Self::Hash | Self::Dash => None,
        }
    }

    /// Closing line for a header written in this dialect, if it needs one.
    pub fn close(self) -> Option<&'static str> {
        match self {
            Self::Block => Some(" */"),
            Self::Markup => Some("-->"),
            Self::Hash | Self::Dash => None,
        }
    }

    /// Prefix placed before every content line of a header.
    pub fn line_prefix(self) -> &'static str {
        match self {
            Self::Block => " * ",
            Self::Hash => "# ",
            Self::Dash => "-- ",
            Self::Markup => "",
        }
    }
}

/// Removes a run of `token` from the start of `line`, plus one following space.
fn strip_leading_run<'a>(line: &'a str, token: &str) -> &'a str {
    let mut rest = line;
    let mut matched = false;
    if token == "/*" {
        if let Some(after) = rest.strip_prefix("/*") {
            rest = after.trim_start_matches('*');
            matched = true;
        }
    } else {
        while let Some(after) = rest.strip_prefix(token) {
            rest = after;
            matched = true;
        }
    }
    if matched {
        rest.strip_prefix(' ').unwrap_or(rest)
    } else {
        line
    }
}

/// A recognized source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Lowercase file extension without the dot.
    pub extension: &'static str,
    /// Display name used for per-language statistics.
    pub name: &'static str,
    /// Comment dialect used for the header.
    pub dialect: CommentDialect,
    /// Whether the write gate requires a header for this extension.
    pub gated: bool,
}

const fn lang(
    extension: &'static str,
    name: &'static str,
    dialect: CommentDialect,
    gated: bool,
) -> Language {
    Language {
        extension,
        name,
        dialect,
        gated,
    }
}

static LANGUAGES: &[Language] = &[
    lang("rs", "Rust", CommentDialect::Block, true),
    lang("c", "C", CommentDialect::Block, true),
    lang("h", "C Header", CommentDialect::Block, true),
    lang("cpp", "C++", CommentDialect::Block, true),
    lang("hpp", "C++ Header", CommentDialect::Block, true),
    lang("java", "Java", CommentDialect::Block, true),
    lang("js", "JavaScript", CommentDialect::Block, true),
    lang("jsx", "JSX", CommentDialect::Block, true),
    lang("ts", "TypeScript", CommentDialect::Block, true),
    lang("tsx", "TSX", CommentDialect::Block, true),
    lang("go", "Go", CommentDialect::Block, true),
    lang("swift", "Swift", CommentDialect::Block, true),
    lang("kt", "Kotlin", CommentDialect::Block, true),
    lang("scala", "Scala", CommentDialect::Block, true),
    lang("cs", "C#", CommentDialect::Block, true),
    lang("css", "CSS", CommentDialect::Block, true),
    lang("scss", "SCSS", CommentDialect::Block, true),
    lang("py", "Python", CommentDialect::Hash, true),
    lang("rb", "Ruby", CommentDialect::Hash, true),
    lang("sh", "Shell", CommentDialect::Hash, true),
    lang("bash", "Bash", CommentDialect::Hash, true),
    lang("yaml", "YAML", CommentDialect::Hash, false),
    lang("yml", "YAML", CommentDialect::Hash, false),
    lang("toml", "TOML", CommentDialect::Hash, false),
    lang("r", "R", CommentDialect::Hash, false),
    lang("sql", "SQL", CommentDialect::Dash, true),
    lang("lua", "Lua", CommentDialect::Dash, true),
    lang("hs", "Haskell", CommentDialect::Dash, true),
    lang("html", "HTML", CommentDialect::Markup, true),
    lang("xml", "XML", CommentDialect::Markup, true),
    lang("svg", "SVG", CommentDialect::Markup, true),
    lang("vue", "Vue", CommentDialect::Markup, true),
];

/// All recognized languages, in registry order.
pub fn languages() -> &'static [Language] {
    LANGUAGES
}

/// Look up a language by extension (with or without the leading dot).
pub fn language_for_extension(extension: &str) -> Option<&'static Language> {
    let extension = extension.trim_start_matches('.').to_lowercase();
    LANGUAGES.iter().find(|language| language.extension == extension)
}

/// Look up the language of a path from its extension.
pub fn language_for_path(path: &Path) -> Option<&'static Language> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(language_for_extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn block_strips_openers_stars_and_closers() {
        assert_eq!(CommentDialect::Block.strip("/* THIS FILE */"), "THIS FILE");
        assert_eq!(CommentDialect::Block.strip("/** docs"), "docs");
        assert_eq!(CommentDialect::Block.strip(" * TYPE: WHOLE"), "TYPE: WHOLE");
        assert_eq!(CommentDialect::Block.strip("   **  bold"), "bold");
        assert_eq!(CommentDialect::Block.strip(" */"), "");
        assert_eq!(CommentDialect::Block.strip("let x = 1;"), "let x = 1;");
    }

    #[test]
    fn hash_and_dash_strip_leading_runs() {
        assert_eq!(CommentDialect::Hash.strip("## METHOD"), "METHOD");
        assert_eq!(CommentDialect::Hash.strip("  # - foo: bar"), "- foo: bar");
        assert_eq!(CommentDialect::Dash.strip("-- ========"), "========");
        assert_eq!(CommentDialect::Dash.strip("---- IMPORTED"), "IMPORTED");
        assert_eq!(CommentDialect::Dash.strip("- entry"), "- entry");
    }

    #[test]
    fn markup_strips_both_ends() {
        assert_eq!(CommentDialect::Markup.strip("<!-- banner -->"), "banner");
        assert_eq!(CommentDialect::Markup.strip("<!--"), "");
        assert_eq!(CommentDialect::Markup.strip("TYPE: x"), "TYPE: x");
        assert_eq!(CommentDialect::Markup.strip("-->"), "");
    }

    #[test]
    fn registry_resolves_extensions_case_insensitively() {
        let rust = language_for_path(Path::new("src/Main.RS")).expect("rust");
        assert_eq!(rust.name, "Rust");
        assert_eq!(rust.dialect, CommentDialect::Block);

        let yaml = language_for_extension(".yml").expect("yaml");
        assert_eq!(yaml.name, "YAML");
        assert!(!yaml.gated);

        assert!(language_for_path(Path::new("README.md")).is_none());
        assert!(language_for_path(Path::new("Makefile")).is_none());
    }

    #[test]
    fn registry_uses_each_dialect() {
        let used: std::collections::HashSet<CommentDialect> =
            languages().iter().map(|language| language.dialect).collect();
        assert_eq!(used.len(), 4);
        assert!(used.contains(&CommentDialect::Hash));
    }

    #[test]
    fn every_extension_is_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for language in languages() {
            assert!(seen.insert(language.extension), "{}", language.extension);
        }
    }
}
