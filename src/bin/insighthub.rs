//! CLI binary for insighthub.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig`, picks the active source, and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use insighthub::{
    analyze, extract_insights, AnalysisConfig, AnalysisOutput, PdfInsights, Source,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze a local PDF
  insighthub paper.pdf

  # Analyze by URL reference (the model receives the link, nothing is fetched)
  insighthub --url https://arxiv.org/abs/1706.03762

  # Analyze pasted notes
  insighthub --notes "Attention mechanisms replace recurrence entirely..."

  # Notes from a file
  insighthub --notes-file notes.txt

  # Inspect PDF extraction only (no API key needed)
  insighthub --inspect paper.pdf

  # Structured JSON output
  insighthub --json paper.pdf > insight.json

  # Different model, longer replies
  insighthub --model openai/gpt-oss-120b --max-output-tokens 4096 paper.pdf

ENVIRONMENT VARIABLES:
  OPENROUTER_API_KEY      API key for the chat-completions endpoint
  INSIGHTHUB_MODEL        Override the model ID
  INSIGHTHUB_API_URL      Override the endpoint URL

SETUP:
  1. Set API key:   export OPENROUTER_API_KEY=sk-or-...
  2. Analyze:       insighthub document.pdf

  PDF extraction binds to the pdfium shared library at runtime; set
  PDFIUM_LIB_PATH if it is not on the default search path.
"#;

/// Analyze a PDF, URL, or notes into a typed insight record.
#[derive(Parser, Debug)]
#[command(
    name = "insighthub",
    version,
    about = "Turn a PDF, URL, or notes into a summary, key phrases, quotes, and a knowledge card",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file to analyze.
    #[arg(conflicts_with_all = ["url", "notes", "notes_file"])]
    pdf: Option<PathBuf>,

    /// Analyze a URL reference instead of a file.
    #[arg(long, conflicts_with_all = ["notes", "notes_file"])]
    url: Option<String>,

    /// Analyze pasted notes instead of a file.
    #[arg(long, conflicts_with = "notes_file")]
    notes: Option<String>,

    /// Read notes from a file.
    #[arg(long)]
    notes_file: Option<PathBuf>,

    /// API key. Falls back to OPENROUTER_API_KEY.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model ID.
    #[arg(long, env = "INSIGHTHUB_MODEL")]
    model: Option<String>,

    /// Chat-completions endpoint URL.
    #[arg(long, env = "INSIGHTHUB_API_URL")]
    api_url: Option<String>,

    /// Generation-length cap per round trip.
    #[arg(long, env = "INSIGHTHUB_MAX_TOKENS", default_value_t = 2048)]
    max_output_tokens: usize,

    /// Per-round-trip HTTP timeout in seconds.
    #[arg(long, env = "INSIGHTHUB_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "INSIGHTHUB_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Print PDF extraction output only, no model call.
    #[arg(long)]
    inspect: bool,

    /// Output structured JSON instead of formatted text.
    #[arg(long)]
    json: bool,

    /// Show the model's reasoning trace after the result.
    #[arg(long)]
    reasoning: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve the active source ────────────────────────────────────────
    let source = resolve_source(&cli).await?;

    // ── Inspect-only mode: extraction output, no model call ──────────────
    if cli.inspect {
        let Some(Source::Document { name, insights }) = source else {
            anyhow::bail!("--inspect requires a PDF file argument");
        };
        print_inspection(&name, &insights, cli.json)?;
        return Ok(());
    }

    let Some(source) = source else {
        anyhow::bail!("Provide a PDF path, --url, --notes, or --notes-file");
    };

    // ── Build config and run ─────────────────────────────────────────────
    let config = build_config(&cli).await?;
    let output = analyze(&source, &config).await.context("Analysis failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize output")?
        );
    } else {
        print_insight(&output, cli.reasoning)?;
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "   {}",
            dim(&format!(
                "{} tokens in / {} tokens out — {}ms total",
                output.stats.prompt_tokens, output.stats.completion_tokens, output.stats.total_ms
            ))
        );
    }

    Ok(())
}

/// Pick the active source from the CLI flags, extracting the PDF if given.
async fn resolve_source(cli: &Cli) -> Result<Option<Source>> {
    if let Some(ref path) = cli.pdf {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let insights = extract_insights(bytes)
            .await
            .context("PDF extraction failed")?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Ok(Some(Source::Document { name, insights }));
    }
    if let Some(ref url) = cli.url {
        return Ok(Some(Source::Url(url.clone())));
    }
    if let Some(ref notes) = cli.notes {
        return Ok(Some(Source::Notes(notes.clone())));
    }
    if let Some(ref path) = cli.notes_file {
        let notes = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(Some(Source::Notes(notes)));
    }
    Ok(None)
}

/// Map CLI args to `AnalysisConfig`.
async fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder()
        .max_output_tokens(cli.max_output_tokens)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref url) = cli.api_url {
        builder = builder.api_url(url.clone());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {}", path.display()))?;
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}

/// Print extraction output for `--inspect`.
fn print_inspection(name: &str, insights: &PdfInsights, as_json: bool) -> Result<()> {
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(insights).context("Failed to serialize insights")?
        );
        return Ok(());
    }

    println!("File:       {name}");
    println!("Pages:      {}", insights.page_count);
    println!("Bytes:      {}", insights.bytes);
    if let Some(ref t) = insights.metadata.title {
        println!("Title:      {t}");
    }
    if let Some(ref a) = insights.metadata.author {
        println!("Author:     {a}");
    }
    if let Some(ref s) = insights.metadata.subject {
        println!("Subject:    {s}");
    }
    if let Some(ref k) = insights.metadata.keywords {
        println!("Keywords:   {k}");
    }
    if !insights.outline.is_empty() {
        println!("Outline:");
        for title in &insights.outline {
            println!("  • {title}");
        }
    }
    println!("\n{}", insights.text);
    Ok(())
}

/// Print the formatted insight record.
fn print_insight(output: &AnalysisOutput, show_reasoning: bool) -> Result<()> {
    let insight = &output.insight;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", bold("Summary"))?;
    writeln!(out, "{}\n", insight.summary)?;

    writeln!(out, "{}", bold("Primary view"))?;
    writeln!(out, "{}\n", insight.primary_view)?;

    if !insight.key_phrases.is_empty() {
        writeln!(out, "{}", bold("Key phrases"))?;
        writeln!(out, "{}\n", insight.key_phrases.join(" · "))?;
    }

    if !insight.quotes.is_empty() {
        writeln!(out, "{}", bold("Quotes"))?;
        for quote in &insight.quotes {
            writeln!(out, "  “{quote}”")?;
        }
        writeln!(out)?;
    }

    if !insight.related.is_empty() {
        writeln!(out, "{}", bold("Related"))?;
        for item in &insight.related {
            let url = item.url.as_deref().unwrap_or("");
            writeln!(out, "  • [{}] {} {}", item.kind, item.title, dim(url))?;
            if let Some(ref note) = item.note {
                writeln!(out, "      {}", dim(note))?;
            }
        }
        writeln!(out)?;
    }

    let card = &insight.knowledge_card;
    writeln!(out, "{}", bold(&cyan(&card.title)))?;
    for bullet in &card.bullets {
        writeln!(out, "  - {bullet}")?;
    }
    writeln!(out, "  {}", dim(&card.source_hint))?;

    if show_reasoning {
        if let Some(ref trace) = output.reasoning {
            writeln!(out, "\n{}", bold("Reasoning trace"))?;
            writeln!(out, "{}", dim(trace))?;
        }
    }

    Ok(())
}
