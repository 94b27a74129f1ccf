//! CLI binary for docreader.
//!
//! A thin shim over the library crate: `serve` runs the web UI, `convert`
//! runs the same handler over local files.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docreader::{
    ConversionFailed, ConversionHandler, ConversionProgressCallback, ConversionResult,
    ExternalCommand, FileOutcome, ProgressCallback, ReaderConfig, UploadedFile,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch and a log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(0);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} file(s)…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, file_name: &str) {
        self.bar.set_message(file_name.to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, result: &ConversionResult) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index + 1,
            total,
            result.file_name,
            dim(&format!(
                "{} → {} bytes",
                result.original_size_bytes, result.converted_size_bytes
            )),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, error: &ConversionFailed) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let reason = if error.reason.chars().count() > 80 {
            let cut: String = error.reason.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.reason.clone()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            error.file_name,
            red(&reason),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} file(s) converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} file(s) converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the web UI on http://127.0.0.1:8000
  docreader serve

  # Listen on all interfaces with a 50 MB upload limit
  docreader serve --bind 0.0.0.0:8080 --max-upload-mb 50

  # Delegate conversion to markitdown instead of the built-in readers
  docreader serve --external-command markitdown

  # Convert files and print Markdown to stdout
  docreader convert report.docx

  # Write report_converted.md / report_converted.txt into out/
  docreader convert report.docx budget.xlsx slides.pptx -o out/

  # JSON outcomes with size statistics
  docreader convert --json *.pdf > outcomes.json

SUPPORTED FORMATS:
  .docx  .xlsx  .pptx  .pdf  .html (.htm)

ENVIRONMENT VARIABLES:
  DOCREADER_BIND              Address for `serve` (default 127.0.0.1:8000)
  DOCREADER_MAX_UPLOAD_MB     Upload limit for `serve` in MB (default 200)
  DOCREADER_EXTERNAL_COMMAND  External converter command line, e.g. "markitdown"
  DOCREADER_SCRATCH_DIR       Directory for temporary copies made for it
  RUST_LOG                    Log filter, overrides --verbose / --quiet
"#;

/// Convert Office documents, PDFs and HTML pages to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "docreader",
    version,
    about = "Convert Office documents, PDFs and HTML pages to Markdown",
    long_about = "Convert DOCX, XLSX, PPTX, PDF and HTML documents to Markdown text, either \
from a browser upload form (`docreader serve`) or for local files (`docreader convert`).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCREADER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCREADER_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web UI.
    Serve(ServeArgs),
    /// Convert local files.
    Convert(ConvertArgs),
}

/// Options shared by both subcommands.
#[derive(Args, Debug)]
struct ConverterArgs {
    /// External converter command line; the file path is appended.
    #[arg(long, env = "DOCREADER_EXTERNAL_COMMAND")]
    external_command: Option<String>,

    /// Directory for temporary copies made for the external converter.
    #[arg(long, env = "DOCREADER_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Largest decompressed size of one part of an Office archive, in MB.
    #[arg(long, env = "DOCREADER_MAX_PART_MB", default_value_t = 256,
          value_parser = clap::value_parser!(u32).range(1..=65536))]
    max_part_mb: u32,

    /// Keep converter output exactly as produced (skip Markdown cleanup).
    #[arg(long, env = "DOCREADER_NO_CLEAN")]
    no_clean: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "DOCREADER_BIND", default_value = "127.0.0.1:8000")]
    bind: String,

    /// Maximum request size in MB.
    #[arg(long, env = "DOCREADER_MAX_UPLOAD_MB", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(1..=4096))]
    max_upload_mb: u32,

    /// Height of the preview text area, in rows.
    #[arg(long, env = "DOCREADER_PREVIEW_ROWS", default_value_t = 15)]
    preview_rows: u16,

    /// Leave the "show size comparison" box unchecked by default.
    #[arg(long, env = "DOCREADER_NO_COMPARE")]
    no_compare: bool,

    #[command(flatten)]
    converter: ConverterArgs,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Files to convert, processed in the order given.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write `<name>_converted.md` and `.txt` into this directory instead of stdout.
    #[arg(short, long, env = "DOCREADER_OUTPUT")]
    output: Option<PathBuf>,

    /// Print JSON outcomes instead of Markdown.
    #[arg(long, env = "DOCREADER_JSON")]
    json: bool,

    /// Print the size comparison for each converted file.
    #[arg(long, env = "DOCREADER_COMPARE")]
    compare: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOCREADER_NO_PROGRESS")]
    no_progress: bool,

    #[command(flatten)]
    converter: ConverterArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = match &cli.command {
        Command::Convert(args) => !cli.quiet && !args.no_progress && !args.json,
        Command::Serve(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Convert(args) => run_convert(args, show_progress, cli.quiet).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let builder = converter_builder(&args.converter)?
        .max_upload_bytes(args.max_upload_mb as usize * 1024 * 1024)
        .preview_rows(args.preview_rows)
        .show_comparison(!args.no_compare);
    let config = builder.build().context("Invalid configuration")?;

    let handler = ConversionHandler::from_config(config);
    docreader::server::serve(&args.bind, handler)
        .await
        .context("Server failed")
}

async fn run_convert(args: ConvertArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let files = args
        .files
        .iter()
        .map(UploadedFile::from_path)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read input")?;

    let mut builder = converter_builder(&args.converter)?.show_comparison(args.compare);
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let handler = Arc::new(ConversionHandler::from_config(config));
    let outcomes = handler
        .process_batch_async(files)
        .await
        .context("Conversion failed")?;

    if args.json {
        let reports: Vec<_> = outcomes.iter().map(FileOutcome::report).collect();
        let json = serde_json::to_string_pretty(&reports).context("Failed to serialise output")?;
        println!("{json}");
    } else if let Some(ref dir) = args.output {
        for result in outcomes.iter().filter_map(FileOutcome::as_result) {
            let paths = result.write_downloads(dir)?;
            if !quiet {
                for path in paths {
                    eprintln!("   {}  {}", green("→"), bold(&path.display().to_string()));
                }
            }
        }
    } else {
        write_stdout(&outcomes).context("Failed to write to stdout")?;
    }

    // Without the progress bar nobody has reported failures yet.
    if !quiet && !show_progress {
        for failed in outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed(f) => Some(f),
            FileOutcome::Converted(_) => None,
        }) {
            eprintln!("{} {}", red("✗"), failed);
        }
    }

    if args.compare && !args.json && !quiet {
        for result in outcomes.iter().filter_map(FileOutcome::as_result) {
            print_size_report(result);
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} file(s) could not be converted", failed, outcomes.len());
    }
    Ok(())
}

/// Map shared CLI flags onto the config builder.
fn converter_builder(args: &ConverterArgs) -> Result<docreader::ReaderConfigBuilder> {
    let mut builder = ReaderConfig::builder()
        .clean_output(!args.no_clean)
        .max_part_bytes(u64::from(args.max_part_mb) * 1024 * 1024);

    if let Some(ref line) = args.external_command {
        let command = ExternalCommand::parse(line)
            .with_context(|| format!("Invalid --external-command '{line}'"))?;
        builder = builder.external_command(command);
    }
    if let Some(ref dir) = args.scratch_dir {
        builder = builder.scratch_dir(dir);
    }
    Ok(builder)
}

/// Markdown of every converted file; a marker comment separates files.
fn write_stdout(outcomes: &[FileOutcome]) -> io::Result<()> {
    let converted: Vec<&ConversionResult> =
        outcomes.iter().filter_map(FileOutcome::as_result).collect();
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for (i, result) in converted.iter().enumerate() {
        if converted.len() > 1 {
            if i > 0 {
                handle.write_all(b"\n")?;
            }
            writeln!(handle, "<!-- {} -->", result.file_name)?;
        }
        handle.write_all(result.text_content.as_bytes())?;
        // Ensure a trailing newline on stdout.
        if !result.text_content.ends_with('\n') {
            handle.write_all(b"\n")?;
        }
    }
    handle.flush()
}

fn print_size_report(result: &ConversionResult) {
    let report = result.size_report();
    eprintln!("{}", bold(&result.file_name));
    for row in &report.rows {
        eprintln!(
            "   {:<22} {:>12} MB  {}",
            row.label,
            row.megabytes,
            dim(&format!("{} bytes", row.bytes))
        );
    }
    eprintln!("   {}", report.summary());
}
