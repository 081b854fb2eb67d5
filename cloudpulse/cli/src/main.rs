use std::{
    fmt::Write as _,
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloudpulse_sentiment::{
    comparative::title_case, AnalysisConfig, BatchMetrics, LexiconClassifier, OpinionRecord,
    RunReport, SentimentPipeline, SentimentTelemetry, SourceUnit, UnitKind,
};
use serde::{de::DeserializeOwned, Deserialize};
use shared_event_bus::FileEventPublisher;
use shared_logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "cloudpulse", version, about = "Cloud provider sentiment comparison")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extracts, classifies and ranks a raw text corpus.
    Analyze(AnalyzeArgs),
    /// Ranks records that were classified elsewhere.
    Rank {
        /// JSON-lines file of opinion records.
        #[arg(long)]
        records: PathBuf,
        /// JSON configuration file; built-in defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Writes the full run report as JSON to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Prints the default configuration.
    Config,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// JSON-lines file of `{batch, kind, text, source, url}` entries.
    #[arg(long)]
    corpus: PathBuf,
    /// JSON configuration file; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Writes the full run report as JSON to this path.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Appends structured JSON-lines logs to this file.
    #[arg(long)]
    log: Option<PathBuf>,
    /// Appends batch and run events as JSON lines to this file.
    #[arg(long)]
    event_log: Option<PathBuf>,
    /// Also log per-unit detail.
    #[arg(long)]
    verbose: bool,
}

/// One corpus line: a post or comment tagged with its batch.
#[derive(Debug, Clone, Deserialize)]
struct CorpusEntry {
    batch: String,
    #[serde(default)]
    kind: UnitKind,
    #[serde(default)]
    text: Option<String>,
    source: String,
    #[serde(default)]
    url: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args),
        Commands::Rank {
            records,
            config,
            out,
        } => handle_rank(&records, config.as_deref(), out.as_deref()),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&AnalysisConfig::default())?);
            Ok(())
        }
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let entries: Vec<CorpusEntry> = read_jsonl(&args.corpus)?;
    let batches = group_batches(entries);

    let mut telemetry = SentimentTelemetry::builder("cloudpulse.sentiment");
    if let Some(path) = &args.log {
        telemetry = telemetry.log_path(path);
    }
    if args.verbose {
        telemetry = telemetry.min_level(LogLevel::Debug);
    }
    if let Some(path) = &args.event_log {
        telemetry = telemetry.event_publisher(Arc::new(FileEventPublisher::new(path)?));
    }
    let telemetry = telemetry.build()?;

    println!("Starting analysis: {} batches", batches.len());
    println!(
        "Providers: {}",
        config.providers.values().cloned().collect::<Vec<_>>().join(", ")
    );
    println!(
        "Aspects: {}",
        config.aspects.keys().cloned().collect::<Vec<_>>().join(", ")
    );
    println!("{}", "-".repeat(70));

    let mut pipeline =
        SentimentPipeline::new(config, Arc::new(LexiconClassifier::new()), Some(telemetry))?;
    let total = batches.len();
    for (idx, (name, units)) in batches.into_iter().enumerate() {
        let metrics = pipeline.ingest_batch(name, &units);
        println!("{}", render_batch_line(idx + 1, total, &metrics));
    }

    let run = pipeline.finish();
    print!("{}", render_run(&run));
    if let Some(out) = &args.out {
        write_report(out, &run)?;
        println!("Report written to {}", out.display());
    }
    Ok(())
}

fn handle_rank(records: &Path, config: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let records: Vec<OpinionRecord> = read_jsonl(records)?;
    let mut pipeline = SentimentPipeline::new(config, Arc::new(LexiconClassifier::new()), None)?;
    for (idx, record) in records.into_iter().enumerate() {
        pipeline
            .ingest_classified(record)
            .with_context(|| format!("record {}", idx + 1))?;
    }
    let run = pipeline.finish();
    print!("{}", render_run(&run));
    if let Some(out) = out {
        write_report(out, &run)?;
        println!("Report written to {}", out.display());
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path),
        None => Ok(AnalysisConfig::default()),
    }
}

fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line)
            .with_context(|| format!("{} line {}", path.display(), idx + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Splits entries into batches of consecutive equal `batch` values.
fn group_batches(entries: Vec<CorpusEntry>) -> Vec<(String, Vec<SourceUnit>)> {
    let mut batches: Vec<(String, Vec<SourceUnit>)> = Vec::new();
    for entry in entries {
        let unit = SourceUnit {
            kind: entry.kind,
            text: entry.text,
            source: entry.source,
            url: entry.url,
        };
        match batches.last_mut() {
            Some((name, units)) if *name == entry.batch => units.push(unit),
            _ => batches.push((entry.batch, vec![unit])),
        }
    }
    batches
}

fn render_batch_line(idx: usize, total: usize, metrics: &BatchMetrics) -> String {
    format!(
        "[{idx:2}/{total}] {} ✓ {:.1}s | {}p {}c {}s | {:.1}u/s {:.1}s/s | {} errors",
        metrics.name,
        metrics.elapsed_secs,
        metrics.posts,
        metrics.comments,
        metrics.sentences,
        metrics.units_per_sec,
        metrics.sentences_per_sec,
        metrics.classification_errors,
    )
}

fn render_run(run: &RunReport) -> String {
    let rule = "=".repeat(70);
    let mut out = String::new();
    let _ = writeln!(out, "\n{rule}\nANALYSIS COMPLETE\n{rule}");
    let _ = writeln!(out, "Run:                     {}", run.run_id);
    let _ = writeln!(
        out,
        "Generated at:            {}",
        run.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Total runtime:           {:.1}s", run.elapsed_secs);
    let _ = writeln!(out, "Posts processed:         {}", run.counters.posts_processed);
    let _ = writeln!(out, "Comments processed:      {}", run.counters.comments_processed);
    let _ = writeln!(out, "Units processed:         {}", run.counters.units_processed);
    let _ = writeln!(out, "Sentences analyzed:      {}", run.counters.sentences_analyzed);
    let _ = writeln!(out, "Errors encountered:      {}", run.counters.classification_errors);

    let _ = writeln!(out, "\n{rule}\nCOMPARATIVE SENTIMENT ANALYSIS INSIGHTS\n{rule}");
    let report = &run.report;
    if !report.overall_rankings.is_empty() {
        let _ = writeln!(out, "\nOVERALL PROVIDER RANKINGS:");
        for (idx, overall) in report.overall_rankings.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:2}. {:<20} (Score: {:+.3})",
                idx + 1,
                overall.provider,
                overall.score
            );
        }
    }
    if !report.insights.is_empty() {
        let _ = writeln!(out, "\nKEY INSIGHTS:");
        for insight in &report.insights {
            let _ = writeln!(out, "• {insight}");
        }
    }
    if !report.aspect_rankings.is_empty() {
        let _ = writeln!(out, "\nBEST PERFORMERS BY ASPECT:");
        for (aspect, ranking) in &report.aspect_rankings {
            let Some(best) = ranking.best_provider() else {
                continue;
            };
            let score = ranking.score(best).map_or(0.0, |s| s.sentiment_score);
            let _ = writeln!(
                out,
                "• {:<12}: {best} (Score: {score:+.3})",
                title_case(aspect)
            );
        }
    }
    out
}

fn write_report(path: &Path, run: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(run)?;
    fs::write(path, data).with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}
