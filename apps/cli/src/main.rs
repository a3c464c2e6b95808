use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;
use glavki_core::{
    format_chapters_document, format_timestamp, generate_chapters, get_cache_dir,
    get_document_path, get_transcript_path, load_transcript, parse_vtt, render_sample,
    sample_segments, save_transcript, validate_layout, ChapterSource, ChaptersDocument,
    ChatCompletionsInference, DisabledInference, EngineConfig, GenerationReport, Layout, Provider,
    Transcript,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing_subscriber::EnvFilter;

const DEFAULT_TITLES: [&str; 5] = [
    "Complete Educational Guide",
    "Everything You Need to Know",
    "Master the Basics",
    "Essential Review",
    "Ultimate Study Guide",
];
const DEFAULT_TAGS: &str = "#EducationalContent #Tutorial #Learning";

/// Segments shown to the title/tag suggestion calls
const EXTRAS_SAMPLE_SEGMENTS: usize = 200;

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "glavki")]
#[command(about = "Turn a video transcript into AI-powered YouTube chapters")]
struct Cli {
    /// Subtitle file (.vtt) or previously cached transcript (.json)
    source: PathBuf,

    /// Number of chapters to generate (question count with --questions)
    count: usize,

    /// Structure for Q&A videos: introduction + questions + closing
    #[arg(short, long)]
    questions: bool,

    /// AI provider for chapter inference
    #[arg(short, long, default_value = "grok")]
    provider: CliProvider,

    /// API key (falls back to the provider's environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Seconds to wait for the inference call
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Directory for the chapters document
    #[arg(short, long, default_value = "chapters")]
    out_dir: PathBuf,

    /// Title used for the output file name (defaults to the source file stem)
    #[arg(long)]
    title: Option<String>,

    /// Skip title/tag suggestions even when a key is available
    #[arg(long)]
    no_extras: bool,

    /// Force re-parsing even if a cached transcript exists
    #[arg(short, long)]
    force: bool,
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Strip filesystem-hostile characters and bound the length.
fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(100)
        .collect()
}

async fn read_source(path: &Path) -> Result<Transcript> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let transcript = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content).context("failed to parse transcript JSON")?,
        _ => parse_vtt(&content),
    };
    Ok(transcript)
}

async fn suggest_extras(
    inference: &ChatCompletionsInference,
    transcript: &Transcript,
    report: &GenerationReport,
) -> (Vec<String>, Option<String>) {
    let sampled = sample_segments(transcript, EXTRAS_SAMPLE_SEGMENTS);
    let sample_text = render_sample(&sampled);

    let titles = match inference.suggest_titles(&sample_text, &report.chapters).await {
        Ok(titles) => titles,
        Err(e) => {
            println!(
                "{} Title suggestions failed ({}), using defaults",
                style("!").yellow().bold(),
                e
            );
            DEFAULT_TITLES.iter().map(|t| t.to_string()).collect()
        }
    };
    let tags = match inference.suggest_tags(&sample_text, &report.chapters).await {
        Ok(tags) => tags,
        Err(e) => {
            println!(
                "{} Tag suggestions failed ({}), using defaults",
                style("!").yellow().bold(),
                e
            );
            DEFAULT_TAGS.to_string()
        }
    };

    (titles, Some(tags))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let provider: Provider = cli.provider.clone().into();

    let layout = if cli.questions {
        Layout::Structured { questions: cli.count }
    } else {
        Layout::Flat { count: cli.count }
    };

    // Reject bad requests before touching anything
    if let Err(e) = validate_layout(layout) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
    if !cli.source.is_file() {
        eprintln!(
            "{} source file not found: {}",
            style("Error:").red().bold(),
            cli.source.display()
        );
        std::process::exit(1);
    }

    println!(
        "\n{}  {}\n",
        style("glavki").cyan().bold(),
        style("Chapter Generator").dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();

    // Step 1: Transcript (check cache)
    let source_key = cli.source.to_string_lossy().to_string();
    let cache_dir = get_cache_dir(&source_key);
    fs::create_dir_all(&cache_dir).await?;
    let transcript_path = get_transcript_path(&cache_dir);

    let step_start = Instant::now();
    let transcript = if !cli.force && transcript_path.exists() {
        let transcript = load_transcript(&transcript_path).await?;
        println!(
            "{} Transcript: {} segments, {} {}",
            style("✓").green().bold(),
            transcript.segments.len(),
            format_timestamp(transcript.duration()),
            style("(cached)").dim()
        );
        transcript
    } else {
        let spinner = create_spinner("Parsing transcript...");
        let transcript = read_source(&cli.source).await?;
        save_transcript(&transcript, &transcript_path).await?;
        spinner.finish_with_message(format!(
            "{} Transcript: {} segments, {} {}",
            style("✓").green().bold(),
            transcript.segments.len(),
            format_timestamp(transcript.duration()),
            style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
        ));
        transcript
    };

    // Step 2: Pick the inference strategy
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| provider.api_key_from_env().ok());
    let client = api_key.map(|key| ChatCompletionsInference::new(provider, key));
    if client.is_none() {
        println!(
            "{} No API key for {}, chapters will be time-based",
            style("!").yellow().bold(),
            provider.name()
        );
    }

    // Step 3: Generate the chapters document (check cache with provider+layout)
    let document_path = get_document_path(&cache_dir, &provider, &layout);
    let rendered = if !cli.force && document_path.exists() {
        let rendered = fs::read_to_string(&document_path).await?;
        println!(
            "{} Chapters document {}",
            style("✓").green().bold(),
            style("(cached)").dim()
        );
        rendered
    } else {
        let config = EngineConfig {
            inference_timeout: Duration::from_secs(cli.timeout),
            ..EngineConfig::default()
        };
        let step_start = Instant::now();
        let spinner = create_spinner(&format!("Generating {} chapters...", layout.total()));
        let report = match &client {
            Some(inference) => generate_chapters(&transcript, layout, inference, &config).await?,
            None => generate_chapters(&transcript, layout, &DisabledInference, &config).await?,
        };
        spinner.finish_with_message(format!(
            "{} {} chapters via {} {}",
            style("✓").green().bold(),
            report.chapters.len(),
            match report.source {
                ChapterSource::Inferred => style("AI analysis").yellow(),
                ChapterSource::Fallback => style("time-based fallback").yellow(),
            },
            style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
        ));
        for warning in &report.warnings {
            println!("{} {}", style("!").yellow().bold(), warning);
        }

        // Title/tag suggestions (inference path only)
        let (titles, tags) = match (&client, cli.no_extras) {
            (Some(inference), false) => {
                let spinner = create_spinner("Suggesting titles and tags...");
                let extras = suggest_extras(inference, &transcript, &report).await;
                spinner.finish_with_message(format!(
                    "{} Titles and tags suggested",
                    style("✓").green().bold()
                ));
                extras
            }
            _ => (Vec::new(), None),
        };

        let doc = ChaptersDocument {
            titles,
            chapters: report.chapters,
            tags,
        };
        let rendered = format_chapters_document(&doc);
        fs::write(&document_path, &rendered).await?;
        rendered
    };

    // Step 4: Publish the document
    fs::create_dir_all(&cli.out_dir).await?;
    let title = cli.title.clone().unwrap_or_else(|| {
        cli.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chapters".to_string())
    });
    let out_path = cli.out_dir.join(format!("{}.txt", sanitize_filename(&title)));
    fs::write(&out_path, &rendered).await?;

    println!(
        "\n{} {}\n",
        style("Saved:").dim(),
        style(out_path.display()).cyan()
    );
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", rendered);
    println!(
        "{} {}",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    Ok(())
}
