//! CLI binary for docparsr.
//!
//! A thin shim over the library crate: maps flags to a `ClientConfig` and a
//! job `Configuration`, runs the job and writes every enabled format.

use anyhow::{Context, Result};
use clap::Parser;
use docparsr::{
    AnyElement, ClientConfig, Configuration, DocumentVisitor, Element, ElementType, Format,
    Heading, JobProgressCallback, Page, PageVisitor, Paragraph, ParsingResult, ParsrClient,
    ParsrError, Progress, Word,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the job is queued, switching
/// to a percentage bar once the server starts reporting one.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Instant,
    polls: AtomicUsize,
    /// Set once the bar has switched to percentage style.
    has_percentage: AtomicBool,
}

impl CliProgressCallback {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Uploading");
        bar.set_message("sending document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            started: Instant::now(),
            polls: AtomicUsize::new(0),
            has_percentage: AtomicBool::new(false),
        }
    }

    fn activate_bar(&self) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        self.bar.set_style(style);
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_submitted(&self, job_id: &str) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Queued as job {job_id}"))
        ));
        self.bar.set_prefix("Parsing");
        self.bar.set_message("waiting for the server…");
    }

    fn on_progress(&self, _job_id: &str, progress: &Progress) {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if let Some(pct) = progress.percentage {
            if !self.has_percentage.swap(true, Ordering::SeqCst) {
                self.activate_bar();
            }
            self.bar.set_position(pct.clamp(0.0, 100.0) as u64);
        }
        let status = progress.status.as_deref().unwrap_or("running");
        self.bar.set_message(status.to_string());
    }

    fn on_complete(&self, job_id: &str) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} job {} finished  {}",
            green("✔"),
            bold(job_id),
            dim(&format!(
                "{} polls, {:.1}s",
                self.polls.load(Ordering::SeqCst),
                self.started.elapsed().as_secs_f64()
            )),
        );
    }

    fn on_failure(&self, job_id: Option<&str>, error: &ParsrError) {
        self.bar.finish_and_clear();
        let msg = error.to_string();
        // Keep the line readable when the server echoes a whole page back.
        let msg = if msg.chars().count() > 120 {
            format!("{}\u{2026}", msg.chars().take(119).collect::<String>())
        } else {
            msg
        };
        match job_id {
            Some(id) => eprintln!("{} job {}  {}", red("✘"), id, red(&msg)),
            None => eprintln!("{} upload failed  {}", red("✘"), red(&msg)),
        }
    }
}

// ── Document outline printer ─────────────────────────────────────────────────

/// Prints pages, headings and the start of each paragraph.
#[derive(Default)]
struct OutlinePrinter {
    pages: usize,
    words: usize,
    tables: usize,
}

fn excerpt(children: &[Element], max: usize) -> String {
    let text = children
        .iter()
        .map(Element::text)
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.chars().count() > max {
        format!("{}\u{2026}", text.chars().take(max).collect::<String>())
    } else {
        text
    }
}

impl PageVisitor for OutlinePrinter {
    fn visit_heading(&mut self, heading: &Heading) {
        let level = heading.level.max(1) as usize;
        let indent = "  ".repeat(level - 1);
        let marks = "#".repeat(level);
        println!("  {indent}{marks} {}", excerpt(&heading.content, 100));
    }

    fn visit_paragraph(&mut self, paragraph: &Paragraph) {
        println!("    {}", dim(&excerpt(&paragraph.content, 72)));
    }

    fn visit_word(&mut self, _word: &Word) {
        self.words += 1;
    }

    fn visit_any(&mut self, element: &AnyElement) {
        if element.kind == ElementType::Table {
            self.tables += 1;
            println!("    {} table #{}", cyan("▦"), element.id);
        }
    }
}

impl DocumentVisitor for OutlinePrinter {
    fn visit_page(&mut self, page: &Page) {
        self.pages += 1;
        println!(
            "{} {}",
            bold(&format!("Page {}", page.number)),
            dim(&format!("({} elements)", page.element_count()))
        );
    }
}

// ── Arguments ────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse a PDF with the server's default pipeline, results in ./
  parsr invoice.pdf

  # Only Markdown and plain text, into ./out
  parsr --format markdown --format text -o out invoice.pdf

  # Use a custom pipeline
  parsr --config my-config.json scan.png

  # Print the server's default configuration (a starting point for --config)
  parsr --default-config > my-config.json

  # Print an outline of the parsed document
  parsr --tree report.pdf

  # Fetch the results of a job that already finished
  parsr --job 3f2a9c… --config my-config.json -o out

ENVIRONMENT VARIABLES:
  PARSR_SERVER     Base URL of the Parsr server (default http://localhost:3001)
  PARSR_CONFIG     Path to a configuration JSON file
  RUST_LOG         Overrides the log filter (e.g. docparsr=debug)
"#;

/// Parse documents with a Parsr server.
#[derive(Parser, Debug)]
#[command(
    name = "parsr",
    version,
    about = "Parse PDFs and images with a Parsr server",
    long_about = "Submit a document to a Parsr server, wait for the job to finish and write \
every enabled output format (JSON, text, Markdown, CSV, …) to a directory.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to parse (PDF or image).
    #[arg(required_unless_present_any = ["default_config", "job"])]
    input: Option<PathBuf>,

    /// Base URL of the Parsr server.
    #[arg(long, env = "PARSR_SERVER", default_value = "http://localhost:3001")]
    server: String,

    /// Configuration JSON file. Defaults to the server's own default.
    #[arg(short, long, env = "PARSR_CONFIG")]
    config: Option<PathBuf>,

    /// Output formats to produce; repeat for several. Overrides the
    /// configuration's own selection.
    #[arg(short, long, value_enum)]
    format: Vec<FormatArg>,

    /// Directory the results are written to.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Print the server's default configuration and exit.
    #[arg(long, conflicts_with_all = ["input", "job"])]
    default_config: bool,

    /// Fetch the results of an already finished job instead of submitting.
    /// The server does not say which formats a job produced, so pass the
    /// job's `--config` or the `--format`s to download.
    #[arg(long, conflicts_with = "input")]
    job: Option<String>,

    /// Print an outline of the parsed document (needs the json format).
    #[arg(long)]
    tree: bool,

    /// Milliseconds between queue polls.
    #[arg(long, default_value_t = 1000)]
    poll_interval: u64,

    /// Give up after this many polls report the job still running.
    #[arg(long)]
    max_polls: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Disable the progress spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Json,
    Text,
    Csv,
    Markdown,
    Pdf,
    SimpleJson,
}

impl From<FormatArg> for Format {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Json => Format::Json,
            FormatArg::Text => Format::Text,
            FormatArg::Csv => Format::Csv,
            FormatArg::Markdown => Format::Markdown,
            FormatArg::Pdf => Format::Pdf,
            FormatArg::SimpleJson => Format::SimpleJson,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters, so library INFO logs
    // are silenced while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.default_config;
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

    let mut builder = ClientConfig::builder()
        .base_url(cli.server.clone())
        .poll_interval_ms(cli.poll_interval)
        .request_timeout_secs(cli.timeout);
    if let Some(n) = cli.max_polls {
        builder = builder.max_polls(n);
    }
    let client_config = builder.build().context("Invalid client settings")?;
    let client = ParsrClient::new(client_config).context("Failed to create HTTP client")?;

    // ── Default-config mode ──────────────────────────────────────────────
    if cli.default_config {
        let config = client
            .default_config()
            .await
            .context("Failed to fetch the default configuration")?;
        println!(
            "{}",
            config
                .to_json_pretty()
                .context("Failed to serialise configuration")?
        );
        return Ok(());
    }

    let config = load_configuration(&cli, &client).await?;

    // ── Run or re-attach ─────────────────────────────────────────────────
    let result = match (&cli.job, &cli.input) {
        (Some(job_id), _) => client.load_result(job_id.clone(), config),
        (None, Some(input)) => {
            let job = client.new_job(input, config);
            let outcome = if show_progress {
                job.execute_with(&CliProgressCallback::new()).await
            } else {
                job.execute().await
            };
            outcome.with_context(|| format!("Parsing {} failed", input.display()))?
        }
        (None, None) => anyhow::bail!("No input document given"),
    };

    write_outputs(&cli, &result).await?;

    if cli.tree {
        print_outline(&result).await?;
    }

    Ok(())
}

/// Resolve the job configuration: `--config` file or the server default,
/// then the `--format` override.
async fn load_configuration(cli: &Cli, client: &ParsrClient) -> Result<Configuration> {
    check_job_formats(cli)?;
    let mut config = match &cli.config {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read configuration from {:?}", path))?;
            Configuration::from_json(&bytes)
                .with_context(|| format!("Invalid configuration in {:?}", path))?
        }
        None => client
            .default_config()
            .await
            .context("Failed to fetch the default configuration")?,
    };

    if !cli.format.is_empty() {
        config.output.formats = cli.format.iter().copied().map(Format::from).collect();
    }
    if cli.tree {
        config.output.formats.insert(Format::Json);
    }
    Ok(config)
}

/// `--job` alone would fall back to the server default, which need not
/// match the formats the job was run with.
fn check_job_formats(cli: &Cli) -> Result<()> {
    if let Some(job) = &cli.job {
        if cli.config.is_none() && cli.format.is_empty() && !cli.tree {
            anyhow::bail!(
                "--job {job} needs --config <file> or --format <fmt> to know which results to fetch"
            );
        }
    }
    Ok(())
}

async fn write_outputs(cli: &Cli, result: &ParsingResult) -> Result<()> {
    let saved = result
        .save_all(&cli.output_dir)
        .await
        .with_context(|| format!("Failed to save results to {:?}", cli.output_dir))?;

    if !cli.quiet {
        for path in &saved {
            eprintln!("  {} {}", green("✓"), path.display());
        }
        if saved.is_empty() {
            eprintln!("{} no output format enabled, nothing written", cyan("⚠"));
        }
    }
    Ok(())
}

async fn print_outline(result: &ParsingResult) -> Result<()> {
    let document = result
        .document()
        .await
        .context("Failed to fetch the JSON result")?;
    let mut printer = OutlinePrinter::default();
    document
        .accept(&mut printer)
        .context("Failed to read the JSON result")?;
    eprintln!(
        "{}",
        dim(&format!(
            "{} pages, {} words, {} tables",
            printer.pages, printer.words, printer.tables
        ))
    );
    Ok(())
}
