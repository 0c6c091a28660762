#![deny(missing_docs)]
//! AIGCAP command-line interface.
//!
//! Scans a tree for AI-generated code annotation headers and writes
//! coverage reports, prints header templates, and runs the write/edit gate.

mod hook;

use aigcap_core::{
    Annotation, CoverageClass, FileOutcome, ProjectReport, ScanAccumulator, ScanConfig, Scanner,
    SourceFile, StdFileSystem, UnknownPolicy, analyze_source, language_for_extension,
    render_html, render_json, render_markdown, render_schema, write_header,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "aigcap", version, about = "AIGCAP coverage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ScanArgs {
    /// Directory to scan.
    #[arg(default_value = ".")]
    directory: PathBuf,
    /// Path of the formatted report.
    #[arg(short, long, default_value = "ai_coverage_report.html")]
    output: PathBuf,
    /// Format of the report written to `--output`.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,
    /// Also export the raw report as JSON.
    #[arg(long = "json")]
    json_path: Option<PathBuf>,
    /// Write the JSON schema of the export.
    #[arg(long = "schema")]
    schema_path: Option<PathBuf>,
    /// Additional directory names to exclude (comma-separated).
    #[arg(long, value_delimiter = ',', env = "AIGCAP_EXCLUDE")]
    exclude: Vec<String>,
    /// Maximum number of files processed concurrently.
    #[arg(short = 'j', long, default_value_t = 8, env = "AIGCAP_JOBS")]
    jobs: usize,
    /// Estimate zero AI lines for headers without a `TYPE:` declaration.
    #[arg(long)]
    unknown_as_zero: bool,
    /// Suppress console output.
    #[arg(short, long)]
    quiet: bool,
    /// Log every processed file.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Html,
    Markdown,
    Json,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum DeclaredType {
    Whole,
    AboveHalf,
    BelowHalf,
}

impl From<DeclaredType> for CoverageClass {
    fn from(value: DeclaredType) -> Self {
        match value {
            DeclaredType::Whole => CoverageClass::Whole,
            DeclaredType::AboveHalf => CoverageClass::AboveHalf,
            DeclaredType::BelowHalf => CoverageClass::BelowHalf,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and write the coverage report.
    Scan(ScanArgs),
    /// Print a header template for a file extension.
    Header {
        /// File extension the header is written for (e.g. `rs`, `py`).
        #[arg(long)]
        ext: String,
        /// Declared coverage of the file.
        #[arg(long = "type", value_enum, default_value_t = DeclaredType::Whole)]
        declared: DeclaredType,
    },
    /// Check a write/edit hook payload read from stdin.
    Hook,
}

#[cfg(not(test))]
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let (quiet, verbose) = match &cli.command {
        Commands::Scan(args) => (args.quiet, args.verbose),
        _ => (false, false),
    };
    init_logging(quiet, verbose);

    match run(cli).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
fn main() {}

#[cfg(not(test))]
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[cfg(not(test))]
async fn run(cli: Cli) -> CliResult<i32> {
    match cli.command {
        Commands::Scan(args) => {
            run_scan(args).await?;
            Ok(0)
        }
        Commands::Header { ext, declared } => {
            print!("{}", header_template(&ext, declared.into())?);
            Ok(0)
        }
        Commands::Hook => hook::run_hook().await,
    }
}

async fn run_scan(args: ScanArgs) -> CliResult<ProjectReport> {
    let config = scan_config(&args);
    if !args.quiet {
        println!("Scanning {} ...", display_root(&args.directory));
    }

    let report = scan_tree(&args.directory, config, args.jobs).await?;
    emit_report(&report, &args).await?;

    if !args.quiet {
        print!("{}", render_summary_text(&report));
        println!("Report saved to: {}", args.output.display());
        if let Some(path) = &args.json_path {
            println!("JSON exported to: {}", path.display());
        }
        if let Some(path) = &args.schema_path {
            println!("Schema written to: {}", path.display());
        }
    }
    Ok(report)
}

fn scan_config(args: &ScanArgs) -> ScanConfig {
    let policy = if args.unknown_as_zero {
        UnknownPolicy::Zero
    } else {
        UnknownPolicy::AssumeBelowHalf
    };
    ScanConfig::default()
        .with_extra_excludes(&args.exclude)
        .with_unknown_policy(policy)
}

async fn scan_tree(root: &Path, config: ScanConfig, jobs: usize) -> CliResult<ProjectReport> {
    let policy = config.unknown_policy;
    let scanner = Scanner::with_config(StdFileSystem::new(), config);
    let sources = scanner.discover(root)?;
    let jobs = jobs.max(1);
    info!(
        "scanning {} recognized files under {} with {jobs} workers",
        sources.len(),
        root.display()
    );

    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut tasks = JoinSet::new();

    for source in sources {
        let permit = semaphore.clone().acquire_owned().await?;
        tasks.spawn(async move {
            let _permit = permit;
            analyze_file(source, policy).await
        });
    }

    let mut accumulator = ScanAccumulator::new(root);
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Some(outcome)) => accumulator.absorb(outcome),
            Ok(None) => {}
            Err(err) => warn!("file task failed: {err}"),
        }
    }

    let report = accumulator.finish();
    info!(
        "scanned {} files, {} with headers",
        report.total_files_scanned, report.total_files_with_annotation
    );
    Ok(report)
}

async fn analyze_file(source: SourceFile, policy: UnknownPolicy) -> Option<FileOutcome> {
    let bytes = match tokio::fs::read(&source.path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("skipping unreadable file {}: {err}", source.relative);
            return None;
        }
    };
    let content = String::from_utf8_lossy(&bytes);
    let outcome = analyze_source(&source, &content, policy);
    debug!("{}: {}", source.relative, aigcap_core::scanner::describe_outcome(&outcome));
    Some(outcome)
}

async fn emit_report(report: &ProjectReport, args: &ScanArgs) -> CliResult<()> {
    let contents = match args.format {
        OutputFormat::Html => render_html(report),
        OutputFormat::Markdown => render_markdown(report),
        OutputFormat::Json => render_json(report)?,
    };
    tokio::fs::write(&args.output, contents).await?;

    if let Some(path) = &args.json_path {
        tokio::fs::write(path, render_json(report)?).await?;
    }
    if let Some(path) = &args.schema_path {
        tokio::fs::write(path, render_schema()?).await?;
    }
    Ok(())
}

fn header_template(extension: &str, class: CoverageClass) -> CliResult<String> {
    let Some(language) = language_for_extension(extension) else {
        return Err(format!("unrecognized extension: {extension}").into());
    };
    let annotation = Annotation {
        class,
        ..Annotation::default()
    };
    Ok(write_header(&annotation, language.dialect))
}

fn display_root(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn render_summary_text(report: &ProjectReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "\nResults:");
    let _ = writeln!(output, "  Files scanned:     {}", report.total_files_scanned);
    let _ = writeln!(
        output,
        "  Files with AIGCAP: {}",
        report.total_files_with_annotation
    );
    let _ = writeln!(
        output,
        "  AI coverage:       {:.1}% ({} / {} lines)",
        report.coverage_percent(),
        report.total_ai_lines(),
        report.total_lines()
    );
    let flagged: Vec<_> = report
        .files
        .iter()
        .filter(|file| !file.issues.is_empty())
        .collect();
    if !flagged.is_empty() {
        let _ = writeln!(output, "  Files with range warnings:");
        for file in flagged {
            let _ = writeln!(output, "    - {} ({})", file.path, file.issues.join("; "));
        }
    }
    let _ = writeln!(output);
    output
}
