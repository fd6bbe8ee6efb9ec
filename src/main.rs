//! Scansum - AI-powered host-scan summarizer
//!
//! A CLI tool that normalizes JSON exports of scanned hosts, computes
//! aggregate statistics, and asks an LLM for a security narrative.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad input, API failure, write failure, etc.)

mod ai;
mod cli;
mod config;
mod input;
mod models;
mod pipeline;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{ScanMetadata, ScanReport};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Scansum v{}", env!("CARGO_PKG_VERSION"));
    debug!("Input: {:?}, preset: {}", args.input, args.summary_type);

    // Run the summarization
    match run_summarize(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Summarization failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .scansum.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".scansum.toml");

    if path.exists() {
        eprintln!("⚠️  .scansum.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .scansum.toml")?;

    println!("✅ Created .scansum.toml with default settings.");
    println!("   Edit it to customize model, API endpoint, and report sections.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete summarization workflow.
async fn run_summarize(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Load raw host records
    println!("📥 Loading host data: {}", args.input_name());
    let raw_records = match args.input {
        Some(ref path) => input::load_hosts(path)?,
        None => input::sample_hosts(),
    };
    info!("Loaded {} raw records", raw_records.len());

    // Step 2: Normalize into canonical records
    let hosts = pipeline::clean(&raw_records);
    let dropped = raw_records.len() - hosts.len();
    if dropped > 0 {
        println!("🧹 Normalized {} hosts ({} dropped)", hosts.len(), dropped);
    } else {
        println!("🧹 Normalized {} hosts", hosts.len());
    }

    if hosts.is_empty() {
        anyhow::bail!("No valid host records found in input");
    }

    // Step 3: Aggregate statistics
    let stats = pipeline::summarize(&hosts);

    // Step 4: Generate the narrative (unless stats-only)
    let narrative = if args.stats_only {
        info!("Skipping narrative generation (--stats-only)");
        None
    } else {
        println!("🤖 Generating {} narrative...", args.summary_type);
        println!("   Model: {}", config.model.name);
        println!("   API: {}", config.model.api_url);

        let client = ai::NarrativeClient::new(ai::AiConfig {
            api_url: config.model.api_url.clone(),
            api_key: args.api_key.clone().unwrap_or_default(),
            model_name: config.model.name.clone(),
            temperature: config.model.temperature,
            timeout_seconds: config.model.timeout_seconds,
        });

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        spinner.set_message("Waiting for the model...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = client.summarize_hosts(&hosts, args.summary_type).await;
        spinner.finish_and_clear();

        Some(result?)
    };

    // Step 5: Assemble the result (the boundary owns the combined struct)
    let duration = start_time.elapsed().as_secs_f64();
    let scan_report = ScanReport {
        metadata: ScanMetadata {
            input: args.input_name(),
            generated_at: Utc::now(),
            model_used: narrative.as_ref().map(|_| config.model.name.clone()),
            summary_type: args.summary_type,
            hosts_received: raw_records.len(),
            hosts_normalized: hosts.len(),
            hosts_dropped: dropped,
            duration_seconds: duration,
        },
        narrative,
        stats,
    };

    // Step 6: Render and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&scan_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&scan_report, &config.report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    // Print summary
    let stats = &scan_report.stats;
    println!("\n📊 Summary:");
    println!(
        "   Hosts: {} ({} unique IPs, {} countries)",
        stats.total_hosts, stats.unique_ips, stats.unique_countries
    );
    println!(
        "   Services: {} | Vulnerabilities: {}",
        stats.total_services, stats.total_vulnerabilities
    );
    println!(
        "   Critical-vuln hosts: {} | Malware hosts: {}",
        stats.critical_vulnerability_hosts, stats.malware_detected_hosts
    );
    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Report saved to: {}", args.output.display());

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .scansum.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
