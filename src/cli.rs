//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::SummaryType;
use clap::Parser;
use std::path::PathBuf;

/// Scansum - AI-powered summarizer for network host-scan data
///
/// Normalize a JSON export of scanned hosts (IPs, services, geolocation,
/// vulnerability and malware metadata), compute aggregate statistics, and
/// generate a natural-language security narrative.
///
/// Examples:
///   scansum --input hosts.json
///   scansum --input hosts.json --summary-type brief --format json
///   scansum --sample --stats-only
///   scansum --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON file of host records to summarize
    ///
    /// Accepts a bare array of records or an object with a `hosts` array.
    /// Not required with --sample or --init-config.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Use the built-in sample corpus instead of an input file
    #[arg(long, conflicts_with = "input")]
    pub sample: bool,

    /// Narrative preset to request from the model
    #[arg(short = 't', long, value_enum, default_value_t = SummaryType::Detailed)]
    pub summary_type: SummaryType,

    /// Output file path for the report
    #[arg(short, long, default_value = "scansum_report.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Model to use for narrative generation
    #[arg(
        short,
        long,
        default_value = "llama-3.3-70b-versatile",
        env = "SCANSUM_MODEL"
    )]
    pub model: String,

    /// Base URL of the OpenAI-compatible chat-completions API
    #[arg(
        long,
        default_value = "https://api.groq.com/openai/v1",
        env = "SCANSUM_API_URL"
    )]
    pub api_url: String,

    /// API key for the narrative endpoint
    ///
    /// Not needed with --stats-only.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Temperature for the narrative call (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, default_value = "0.3")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .scansum.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Normalize and aggregate only; skip the narrative call
    #[arg(long)]
    pub stats_only: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .scansum.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.input.is_none() && !self.sample {
            return Err("Provide an input file with --input or use --sample".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        // Narrative settings only matter when the narrative call will run
        if !self.stats_only {
            if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
            if self.api_key.as_deref().map_or(true, str::is_empty) {
                return Err(
                    "API key required: set GROQ_API_KEY or pass --api-key (or use --stats-only)"
                        .to_string(),
                );
            }
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Display name for the input source, used in report metadata.
    pub fn input_name(&self) -> String {
        match self.input {
            Some(ref path) => path.display().to_string(),
            None => "built-in sample".to_string(),
        }
    }
}
