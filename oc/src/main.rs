//! ocrclean - resumable OCR post-correction
//!
//! CLI entry point for the correction pipeline and the regex cleaner.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use ocrclean::cleaner::{CleanOptions, clean_file};
use ocrclean::cli::{CleanArgs, Cli, Command, RunArgs, generate_after_help};
use ocrclean::config::{Config, LlmConfig, PathOverrides, RunPaths};
use ocrclean::llm::create_client;
use ocrclean::oracle::{LengthBound, LlmOracle, OracleClient, RetryPolicy};
use ocrclean::pipeline::{Pipeline, PipelineOptions};
use ocrclean::progression::ProgressionLogger;
use ocrclean::prompts::PromptLoader;
use ocrclean::source::CsvSource;
use ocrclean::store::{CsvSink, FileCheckpoint, ProgressStore};
use ocrclean::{Chunker, domain::text::snippet};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ocrclean")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("ocrclean.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help(&LlmConfig::default().api_key_env));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run(args) => {
            debug!("main: matched Run command");
            cmd_run(config, args).await
        }
        Command::Clean(args) => {
            debug!("main: matched Clean command");
            cmd_clean(&config, args)
        }
        Command::ShowConfig { profile } => {
            debug!(?profile, "main: matched ShowConfig command");
            cmd_show_config(&config, profile.as_deref())
        }
    }
}

async fn cmd_run(mut config: Config, args: RunArgs) -> Result<()> {
    debug!(?args, "cmd_run: called");
    let pipeline_config = &mut config.pipeline;
    if let Some(word_limit) = args.word_limit {
        pipeline_config.word_limit = word_limit;
    }
    if let Some(max_retries) = args.max_retries {
        pipeline_config.max_retries = max_retries;
    }
    if let Some(delay) = args.retry_delay_ms {
        pipeline_config.retry_delay_ms = delay;
    }
    if args.sample.is_some() {
        pipeline_config.sample = args.sample;
    }
    if args.no_resume {
        pipeline_config.resume = false;
    }
    config.validate().context("Invalid configuration")?;

    let paths = RunPaths::resolve(&config.paths, args.profile.as_deref(), args.path_overrides());
    let run_id = Uuid::now_v7().to_string();
    info!(%run_id, ?paths, pipeline = ?config.pipeline, "Starting correction run");

    println!("{}", "=".repeat(60));
    println!("OCR correction run {}", run_id.cyan());
    println!("  Source:      {}", paths.source.display());
    println!("  Destination: {}", paths.destination.display());
    println!("  Checkpoint:  {}", paths.checkpoint.display());
    println!("  Progression: {}", paths.progression.display());
    println!(
        "  Model: {}  word-limit: {}  max-retries: {}",
        config.llm.model, config.pipeline.word_limit, config.pipeline.max_retries
    );
    println!("{}", "=".repeat(60));

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let prompts = PromptLoader::with_default_overrides().context("Failed to load prompts")?;
    let oracle = LlmOracle::new(llm, prompts, config.pipeline.source_kind.as_str()).with_config(&config.llm);
    let client = OracleClient::new(
        Arc::new(oracle),
        RetryPolicy::new(config.pipeline.max_retries, config.pipeline.retry_delay()),
        LengthBound::new(config.pipeline.snap_window),
    );

    let store = ProgressStore::new(
        Box::new(FileCheckpoint::new(&paths.checkpoint)),
        Box::new(CsvSink::new(&paths.destination)),
    );

    let progression = match ProgressionLogger::create(&paths.progression, &run_id, Utc::now()) {
        Ok(logger) => logger,
        Err(e) => {
            warn!(path = %paths.progression.display(), error = %e, "Progression log unavailable");
            eprintln!(
                "{} cannot write {}: {}",
                "Warning:".yellow(),
                paths.progression.display(),
                e
            );
            ProgressionLogger::disabled()
        }
    };

    let source = CsvSource::open(&paths.source).context("Failed to open source")?;

    let mut pipeline = Pipeline::new(
        client,
        store,
        Chunker::new(config.pipeline.word_limit),
        progression,
        PipelineOptions {
            sample_limit: config.pipeline.sample,
            resume: config.pipeline.resume,
        },
    );

    let summary = pipeline.run(source.records()).await.context("Correction run aborted")?;

    println!();
    println!("{}", "=".repeat(60));
    println!("{} {}", "Run complete:".green(), summary);
    if summary.failed > 0 {
        println!(
            "{} {} record(s) failed and remain pending; run again to retry them",
            "Note:".yellow(),
            summary.failed
        );
    }
    info!(%run_id, %summary, "Correction run finished");
    Ok(())
}

fn cmd_clean(config: &Config, args: CleanArgs) -> Result<()> {
    debug!(?args, "cmd_clean: called");
    let profile = args.profile.as_deref().unwrap_or(&config.paths.profile);
    let (preset_input, preset_output) = config.paths.clean_preset(profile);
    let input = args.input.unwrap_or(preset_input);
    let output = args.output.unwrap_or(preset_output);
    let options = CleanOptions {
        test: args.test,
        truncate_incomplete: args.truncate_incomplete,
    };

    println!("{}", "=".repeat(60));
    println!(
        "Regex Text Cleaner [{}]",
        if options.test { "TEST MODE (5 rows)" } else { "FULL MODE" }
    );
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());
    println!("{}", "=".repeat(60));

    let report = clean_file(&input, &output, options).context("Cleaning failed")?;
    println!(
        "{} Saved {} rows to {}",
        "\u{2713}".green(),
        report.rows_written,
        report.output.display()
    );
    if report.skipped_empty + report.skipped_malformed > 0 {
        println!(
            "  skipped {} empty and {} malformed rows",
            report.skipped_empty, report.skipped_malformed
        );
    }

    if !report.preview.is_empty() {
        println!("\n--- SAMPLE OUTPUT (first {} rows) ---", report.preview.len());
        for (i, row) in report.preview.iter().enumerate() {
            println!("\nRow {}:", i + 1);
            println!("  Date: {}", row.key);
            println!(
                "  Original ({} chars): {}...",
                row.original.chars().count(),
                snippet(&row.original, 120)
            );
            println!(
                "  Cleaned ({} chars): {}...",
                row.cleaned.chars().count(),
                snippet(&row.cleaned, 120)
            );
        }
    }
    Ok(())
}

fn cmd_show_config(config: &Config, profile: Option<&str>) -> Result<()> {
    debug!(?profile, "cmd_show_config: called");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    println!("{}", yaml.trim_end());

    let paths = RunPaths::resolve(&config.paths, profile, PathOverrides::default());
    let resolved = serde_yaml::to_string(&paths).context("Failed to serialize paths")?;
    println!("\n# resolved paths ({})", profile.unwrap_or(&config.paths.profile));
    println!("{}", resolved.trim_end());
    Ok(())
}
