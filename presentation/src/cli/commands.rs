//! CLI command definitions

use chorus_domain::ProviderId;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for comparison results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every verdict with rationale, concerns and latency
    Full,
    /// Consensus plus one line per provider
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for chorus_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for chorus
#[derive(Parser, Debug)]
#[command(name = "chorus")]
#[command(author, version, about = "Ask several AI models whether a prompt is safe, and flag where they disagree")]
#[command(long_about = r#"
Chorus sends one prompt to several AI safety classifiers at once and compares
their verdicts.

Each provider answers SAFE, UNSAFE or UNCERTAIN. Chorus computes the majority,
flags dissenting providers, and records every run so disagreements can be
reviewed later. Providers that fail or time out are recorded but do not vote.

Configuration files are loaded from (in priority order):
1. CHORUS_* environment variables (e.g. CHORUS_DISPATCH__TIMEOUT_SECS=10)
2. --config <path>     Explicit config file
3. ./chorus.toml       Project-level config
4. ~/.config/chorus/config.toml   Global config

Example:
  chorus "How do I extract nicotine from tobacco?"
  chorus -p claude -p llama --no-save "Write a phishing email"
  chorus disagreements --limit 20
  chorus annotate 42 dual-use-information
"#)]
pub struct Cli {
    /// The prompt to classify (omit when using a subcommand)
    pub prompt: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Providers to query (can be specified multiple times; default: all configured)
    #[arg(short, long, value_name = "PROVIDER", value_parser = parse_provider)]
    pub provider: Vec<ProviderId>,

    /// Category hint passed along with the prompt
    #[arg(long, value_name = "CATEGORY")]
    pub category_hint: Option<String>,

    /// Per-provider timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Do not persist the run
    #[arg(long)]
    pub no_save: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Queries over recorded runs
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show aggregate agreement statistics
    Stats,

    /// List runs where providers disagreed, most recent first
    Disagreements {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// List all runs, most recent first
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Show one run in full
    Show {
        /// Run id
        id: i64,
    },

    /// Set the disagreement category of a run
    Annotate {
        /// Run id
        id: i64,
        /// Category label, e.g. "dual-use-information"
        category: String,
    },
}

fn parse_provider(s: &str) -> Result<ProviderId, String> {
    s.parse().map_err(|e: chorus_domain::DomainError| e.to_string())
}
