//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::PathOverrides;

/// ocrclean - resumable OCR post-correction
#[derive(Parser)]
#[command(
    name = "oc",
    about = "Resumable, checkpointed LLM post-correction of OCR'd newspaper text",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Correct a cleaned CSV chunk by chunk, resuming where the last run stopped
    Run(RunArgs),

    /// Regex-clean a raw OCR export into the CSV `run` consumes
    Clean(CleanArgs),

    /// Print the resolved configuration as YAML
    ShowConfig {
        /// Also show the paths the profile resolves to
        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Dataset profile selecting preset paths (historical, modern, ...)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Source CSV
    #[arg(long = "src-file")]
    pub src_file: Option<PathBuf>,

    /// Destination CSV, appended to
    #[arg(long = "dst-file")]
    pub dst_file: Option<PathBuf>,

    /// Checkpoint log of completed keys
    #[arg(long = "checkpoint-file")]
    pub checkpoint_file: Option<PathBuf>,

    /// Progression log, truncated each run
    #[arg(long = "progression-file")]
    pub progression_file: Option<PathBuf>,

    /// Process only the first N rows
    #[arg(short, long)]
    pub sample: Option<usize>,

    /// Maximum words per chunk
    #[arg(short, long)]
    pub word_limit: Option<usize>,

    /// Attempts per chunk
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Ignore the existing checkpoint and output
    #[arg(long)]
    pub no_resume: bool,
}

impl RunArgs {
    pub fn path_overrides(&self) -> PathOverrides {
        PathOverrides {
            source: self.src_file.clone(),
            destination: self.dst_file.clone(),
            checkpoint: self.checkpoint_file.clone(),
            progression: self.progression_file.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Dataset profile selecting preset paths
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Raw input CSV
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Cleaned output CSV, overwritten
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Clean only the first 5 rows into a `_TEST` file and preview them
    #[arg(short, long)]
    pub test: bool,

    /// Drop a trailing sentence without terminal punctuation
    #[arg(long)]
    pub truncate_incomplete: bool,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ocrclean")
        .join("logs")
        .join("ocrclean.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with API key status and log location
pub fn generate_after_help(api_key_env: &str) -> String {
    debug!(%api_key_env, "generate_after_help: called");
    let key_set = std::env::var(api_key_env).is_ok();
    let icon = if key_set { "\u{2705}" } else { "\u{274C}" };
    let status = if key_set { "set" } else { "missing" };

    let mut help = String::new();
    help.push_str("API key:\n");
    help.push_str(&format!("  {} {} {}\n", icon, api_key_env, status));
    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "oc",
            "run",
            "--profile",
            "modern",
            "--sample",
            "10",
            "--dst-file",
            "out.csv",
            "--no-resume",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.profile.as_deref(), Some("modern"));
        assert_eq!(args.sample, Some(10));
        assert!(args.no_resume);
        let overrides = args.path_overrides();
        assert_eq!(overrides.destination, Some(PathBuf::from("out.csv")));
        assert!(overrides.source.is_none());
    }

    #[test]
    fn test_parse_clean_with_global_flags() {
        let cli = Cli::try_parse_from(["oc", "clean", "--test", "-l", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Clean(CleanArgs { test: true, .. })));
    }

    #[test]
    fn test_after_help_mentions_log_path() {
        let help = generate_after_help("OC_TEST_KEY_THAT_IS_NOT_SET");
        assert!(help.contains("OC_TEST_KEY_THAT_IS_NOT_SET missing"));
        assert!(help.contains("ocrclean.log"));
    }
}
