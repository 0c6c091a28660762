//! Report formatting utilities for AIGCAP coverage outputs.

use std::fmt::Write;

use serde::Serialize;

use crate::domain::{CoverageClass, EntryKind, FileRecord, LanguageStats, ProjectReport};

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Language stats sorted by AI lines, largest first, then by name.
pub fn format_language_stats(report: &ProjectReport) -> Vec<(&str, &LanguageStats)> {
    let mut items: Vec<(&str, &LanguageStats)> = report
        .language_breakdown
        .iter()
        .map(|(name, stats)| (name.as_str(), stats))
        .collect();
    items.sort_by(|a, b| b.1.ai_lines.cmp(&a.1.ai_lines).then(a.0.cmp(b.0)));
    items
}

/// Files sorted by estimated AI lines, largest first.
pub fn files_by_ai_lines(report: &ProjectReport) -> Vec<&FileRecord> {
    let mut files: Vec<&FileRecord> = report.files.iter().collect();
    files.sort_by(|a, b| {
        b.estimated_ai_lines
            .cmp(&a.estimated_ai_lines)
            .then_with(|| a.path.cmp(&b.path))
    });
    files
}

/// Render a project report as Markdown.
pub fn render_markdown(report: &ProjectReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# AIGCAP Coverage Report\n");
    let _ = writeln!(output, "- Directory: `{}`", report.scan_directory);
    let _ = writeln!(output, "- Scanned at: {}", report.scan_time);
    let _ = writeln!(
        output,
        "- AI coverage: {:.1}% ({} / {} lines)",
        report.coverage_percent(),
        report.total_ai_lines(),
        report.total_lines()
    );
    let _ = writeln!(
        output,
        "- Files: {} scanned, {} with header, {} without\n",
        report.total_files_scanned,
        report.total_files_with_annotation,
        report.total_files_without_annotation
    );

    append_languages(&mut output, report);
    append_files(&mut output, report);
    append_libraries(&mut output, report);
    append_unannotated(&mut output, &report.files_without_annotation);
    output
}

fn append_languages(output: &mut String, report: &ProjectReport) {
    if report.language_breakdown.is_empty() {
        let _ = writeln!(output, "## Languages\nNo recognized files.\n");
        return;
    }
    let _ = writeln!(output, "## Languages");
    let _ = writeln!(output, "| Language | Files | With header | AI lines | Total lines |");
    let _ = writeln!(output, "| --- | ---: | ---: | ---: | ---: |");
    for (language, stats) in format_language_stats(report) {
        let _ = writeln!(
            output,
            "| {language} | {} | {} | {} | {} |",
            stats.files_total, stats.files_with_annotation, stats.ai_lines, stats.total_lines
        );
    }
    let _ = writeln!(output);
}

fn append_files(output: &mut String, report: &ProjectReport) {
    if report.files.is_empty() {
        let _ = writeln!(output, "## Files\nNo AIGCAP headers found.\n");
        return;
    }
    let _ = writeln!(output, "## Files");
    for file in files_by_ai_lines(report) {
        let _ = writeln!(
            output,
            "- `{}` ({}, {}): {}/{} lines ({:.1}%)",
            file.path,
            file.language,
            file.class.label(),
            file.estimated_ai_lines,
            file.total_lines,
            file.ai_percent()
        );
        for entry in &file.entries {
            let _ = writeln!(
                output,
                "  - {} `{}`: {}",
                entry.kind.keyword(),
                entry.name,
                entry.describe()
            );
        }
        for issue in &file.issues {
            let _ = writeln!(output, "  - warning: {issue}");
        }
    }
    let _ = writeln!(output);
}

fn append_libraries(output: &mut String, report: &ProjectReport) {
    let libraries = report.library_summary();
    if libraries.is_empty() {
        let _ = writeln!(output, "## Libraries\nNo libraries declared.\n");
        return;
    }
    let _ = writeln!(output, "## Libraries");
    for (name, summary) in libraries {
        let reasons: Vec<&str> = summary.reasons.iter().map(String::as_str).collect();
        let _ = writeln!(
            output,
            "- **{name}** ({} files): {}",
            summary.files.len(),
            reasons.join("; ")
        );
    }
    let _ = writeln!(output);
}

fn append_unannotated(output: &mut String, paths: &[String]) {
    if paths.is_empty() {
        let _ = writeln!(output, "## Files without header\nEvery scanned file has a header.\n");
        return;
    }
    let _ = writeln!(output, "## Files without header");
    for path in paths {
        let _ = writeln!(output, "- `{path}`");
    }
    let _ = writeln!(output);
}

const STYLE: &str = "
body { font-family: system-ui, sans-serif; background: #0f1117; color: #e4e4ef; margin: 0; }
.dashboard { max-width: 1400px; margin: 0 auto; padding: 32px; }
.meta { color: #8888a8; font-size: 13px; }
.gauge { font-size: 64px; font-weight: 700; color: #4d8eff; }
.gauge-bar, .bar { background: #23263a; border-radius: 6px; height: 12px; overflow: hidden; }
.gauge-bar-fill, .bar-fill { background: linear-gradient(90deg, #4d8eff, #a78bfa); height: 100%; }
.stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; margin: 24px 0; }
.card { background: #181b26; border: 1px solid #23263a; border-radius: 10px; padding: 16px; }
.card .value { font-size: 28px; font-weight: 700; }
table { width: 100%; border-collapse: collapse; margin-bottom: 32px; font-size: 13px; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #23263a; vertical-align: top; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
.tag { display: inline-block; padding: 1px 6px; border-radius: 4px; margin: 1px; background: #23263a; }
.badge-whole { color: #f87171; } .badge-above { color: #fbbf24; } .badge-down { color: #34d399; }
.issue { color: #fbbf24; font-size: 12px; }
";

/// Render a project report as a self-contained HTML dashboard.
pub fn render_html(report: &ProjectReport) -> String {
    let mut output = String::new();
    let coverage = report.coverage_percent();
    let counts = report.class_counts();

    let _ = writeln!(output, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>");
    let _ = writeln!(output, "<meta charset=\"UTF-8\">");
    let _ = writeln!(output, "<title>AIGCAP Coverage Dashboard</title>");
    let _ = writeln!(output, "<style>{STYLE}</style>\n</head>\n<body>\n<div class=\"dashboard\">");
    let _ = writeln!(output, "<h1>AIGCAP Coverage Dashboard</h1>");
    let _ = writeln!(
        output,
        "<p class=\"meta\">{} &middot; {}</p>",
        escape_html(&report.scan_directory),
        escape_html(&report.scan_time)
    );

    let _ = writeln!(output, "<h2>Overall AI Code Coverage</h2>");
    let _ = writeln!(output, "<div class=\"gauge\">{coverage:.1}%</div>");
    let _ = writeln!(
        output,
        "<div class=\"gauge-bar\"><div class=\"gauge-bar-fill\" style=\"width:{:.1}%\"></div></div>",
        coverage.min(100.0)
    );
    let _ = writeln!(
        output,
        "<p class=\"meta\">{} AI-generated lines / {} total lines across {} files</p>",
        report.total_ai_lines(),
        report.total_lines(),
        report.total_files_scanned
    );

    let _ = writeln!(output, "<div class=\"stats\">");
    append_card(&mut output, "Files scanned", &report.total_files_scanned.to_string());
    append_card(
        &mut output,
        "Files with AI code",
        &format!(
            "{} ({:.1}%)",
            report.total_files_with_annotation,
            report.annotated_percent()
        ),
    );
    append_card(&mut output, "Whole AI files", &counts.whole.to_string());
    append_card(&mut output, "Above 50%", &counts.above_half.to_string());
    append_card(&mut output, "Below 50%", &counts.below_half.to_string());
    append_card(&mut output, "Unclassified", &counts.unknown.to_string());
    let _ = writeln!(output, "</div>");

    append_language_table(&mut output, report);
    append_file_table(&mut output, report);
    append_library_table(&mut output, report);

    let _ = writeln!(output, "<h2>Files without header</h2>");
    if report.files_without_annotation.is_empty() {
        let _ = writeln!(output, "<p class=\"meta\">Every scanned file has a header.</p>");
    } else {
        let _ = writeln!(output, "<ul>");
        for path in &report.files_without_annotation {
            let _ = writeln!(output, "<li>{}</li>", escape_html(path));
        }
        let _ = writeln!(output, "</ul>");
    }

    let _ = writeln!(output, "</div>\n</body>\n</html>");
    output
}

fn append_card(output: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        output,
        "<div class=\"card\"><div class=\"meta\">{}</div><div class=\"value\">{}</div></div>",
        escape_html(label),
        escape_html(value)
    );
}

fn append_language_table(output: &mut String, report: &ProjectReport) {
    let _ = writeln!(output, "<h2>Languages</h2>\n<table>");
    let _ = writeln!(
        output,
        "<tr><th>Language</th><th>Files</th><th>With header</th><th>AI lines</th><th>Total lines</th><th>Coverage</th></tr>"
    );
    for (language, stats) in format_language_stats(report) {
        let percent = if stats.total_lines == 0 {
            0.0
        } else {
            stats.ai_lines as f64 / stats.total_lines as f64 * 100.0
        };
        let _ = writeln!(
            output,
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td>{}</td></tr>",
            escape_html(language),
            stats.files_total,
            stats.files_with_annotation,
            stats.ai_lines,
            stats.total_lines,
            bar(percent)
        );
    }
    let _ = writeln!(output, "</table>");
}

fn append_file_table(output: &mut String, report: &ProjectReport) {
    let _ = writeln!(output, "<h2>Files</h2>\n<table>");
    let _ = writeln!(
        output,
        "<tr><th>File</th><th>Language</th><th>Type</th><th>Lines</th><th>AI lines</th><th>Coverage</th><th>Methods</th><th>Structs</th><th>Traits</th><th>Libraries</th></tr>"
    );
    for file in files_by_ai_lines(report) {
        let _ = write!(output, "<tr><td>{}", escape_html(&file.path));
        for issue in &file.issues {
            let _ = write!(output, "<div class=\"issue\">{}</div>", escape_html(issue));
        }
        let _ = write!(
            output,
            "</td><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td>{}</td>",
            escape_html(&file.language),
            badge(file.class),
            file.total_lines,
            file.estimated_ai_lines,
            bar(file.ai_percent())
        );
        for kind in EntryKind::ALL {
            let tags: Vec<String> = file
                .entries
                .iter()
                .filter(|entry| entry.kind == kind)
                .map(|entry| {
                    format!(
                        "<span class=\"tag\" title=\"{}\">{}</span>",
                        escape_html(&entry.describe()),
                        escape_html(&entry.name)
                    )
                })
                .collect();
            let _ = write!(output, "<td>{}</td>", tags_or_dash(&tags));
        }
        let libraries: Vec<String> = file
            .libraries
            .iter()
            .map(|library| format!("<span class=\"tag\">{}</span>", escape_html(&library.name)))
            .collect();
        let _ = writeln!(output, "<td>{}</td></tr>", tags_or_dash(&libraries));
    }
    let _ = writeln!(output, "</table>");
}

fn append_library_table(output: &mut String, report: &ProjectReport) {
    let _ = writeln!(output, "<h2>Libraries</h2>\n<table>");
    let _ = writeln!(
        output,
        "<tr><th>Library</th><th>Reasons</th><th>Files</th><th>Used in</th></tr>"
    );
    for (name, summary) in report.library_summary() {
        let reasons: Vec<String> = summary.reasons.iter().map(|r| escape_html(r)).collect();
        let mut used_in: Vec<String> = summary
            .files
            .iter()
            .take(5)
            .map(|path| escape_html(path))
            .collect();
        if summary.files.len() > 5 {
            used_in.push("...".to_string());
        }
        let _ = writeln!(
            output,
            "<tr><td><strong>{}</strong></td><td>{}</td><td class=\"num\">{}</td><td>{}</td></tr>",
            escape_html(&name),
            reasons.join("; "),
            summary.files.len(),
            used_in.join(", ")
        );
    }
    let _ = writeln!(output, "</table>");
}

fn badge(class: CoverageClass) -> String {
    let css = match class {
        CoverageClass::Whole => "badge-whole",
        CoverageClass::AboveHalf => "badge-above",
        CoverageClass::BelowHalf => "badge-down",
        CoverageClass::Unknown => "badge-unknown",
    };
    format!("<span class=\"{css}\">{}</span>", escape_html(class.label()))
}

fn bar(percent: f64) -> String {
    format!(
        "<div class=\"bar\"><div class=\"bar-fill\" style=\"width:{:.1}%\"></div></div>{percent:.1}%",
        percent.clamp(0.0, 100.0)
    )
}

fn tags_or_dash(tags: &[String]) -> String {
    if tags.is_empty() {
        "&mdash;".to_string()
    } else {
        tags.join(" ")
    }
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoverageEntry, LibraryDeclaration};
    use std::collections::BTreeMap;

    fn sample_report() -> ProjectReport {
        let files = vec![
            FileRecord {
                path: "src/small.rs".to_string(),
                language: "Rust".to_string(),
                class: CoverageClass::BelowHalf,
                entries: vec![CoverageEntry::partial(EntryKind::Unit, "helper", 3, 5)],
                libraries: vec![LibraryDeclaration {
                    name: "serde".to_string(),
                    reason: "json <export>".to_string(),
                }],
                total_lines: 40,
                estimated_ai_lines: 3,
                issues: vec!["`helper` ends at line 5, past the last line 4".to_string()],
            },
            FileRecord {
                path: "src/big.rs".to_string(),
                language: "Rust".to_string(),
                class: CoverageClass::Whole,
                entries: vec![CoverageEntry::whole(EntryKind::Type, "Engine")],
                libraries: vec![LibraryDeclaration {
                    name: "serde".to_string(),
                    reason: "derive".to_string(),
                }],
                total_lines: 60,
                estimated_ai_lines: 60,
                issues: Vec::new(),
            },
        ];
        let mut breakdown = BTreeMap::new();
        breakdown.insert(
            "Rust".to_string(),
            LanguageStats {
                files_total: 3,
                files_with_annotation: 2,
                ai_lines: 63,
                total_lines: 126,
            },
        );
        ProjectReport {
            scan_directory: "/repo".to_string(),
            scan_time: "2026-10-18T00:00:00+00:00".to_string(),
            total_files_scanned: 3,
            total_files_with_annotation: 2,
            total_files_without_annotation: 1,
            files,
            files_without_annotation: vec!["src/<plain>.rs".to_string()],
            language_breakdown: breakdown,
        }
    }

    #[test]
    fn renders_markdown_summary() {
        let output = render_markdown(&sample_report());
        assert!(output.contains("# AIGCAP Coverage Report"));
        assert!(output.contains("AI coverage: 50.0% (63 / 126 lines)"));
        assert!(output.contains("| Rust | 3 | 2 | 63 | 126 |"));
        assert!(output.contains("METHOD `helper`: AI wrote lines 3~5"));
        assert!(output.contains("**serde** (2 files): derive; json <export>"));
        assert!(output.contains("warning: `helper` ends at line 5"));
        let big = output.find("src/big.rs").expect("big");
        let small = output.find("src/small.rs").expect("small");
        assert!(big < small);
    }

    #[test]
    fn renders_html_dashboard_escaped() {
        let output = render_html(&sample_report());
        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("<div class=\"gauge\">50.0%</div>"));
        assert!(output.contains("src/&lt;plain&gt;.rs"));
        assert!(output.contains("json &lt;export&gt;"));
        assert!(output.contains("title=\"AI wrote entire code\">Engine</span>"));
        assert!(!output.contains("<plain>"));
    }

    #[test]
    fn renders_empty_report() {
        let report = ProjectReport {
            scan_directory: "/empty".to_string(),
            scan_time: String::new(),
            total_files_scanned: 0,
            total_files_with_annotation: 0,
            total_files_without_annotation: 0,
            files: Vec::new(),
            files_without_annotation: Vec::new(),
            language_breakdown: BTreeMap::new(),
        };
        let markdown = render_markdown(&report);
        assert!(markdown.contains("No recognized files."));
        assert!(markdown.contains("No AIGCAP headers found."));
        assert!(render_html(&report).contains("0.0%"));
    }

    #[test]
    fn renders_json_payload() {
        let json = render_json(&sample_report()).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed["totalFilesScanned"], 3);
        assert_eq!(parsed["files"][0]["class"], "DOWN_50");
        assert_eq!(parsed["languageBreakdown"]["Rust"]["aiLines"], 63);
        let back: ProjectReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, sample_report());
    }

    #[test]
    fn escapes_html_specials() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
