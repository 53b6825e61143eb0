//! webguard - web application security scanner CLI

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;
use url::Url;

use webguard::config;
use webguard::models::{Finding, ScanConfig, ScanReport, Severity};
use webguard::report;
use webguard::scanner::ScanEngine;

/// webguard - heuristic web application security scanner
#[derive(Parser)]
#[command(name = "webguard", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a security scan against a target
    Scan {
        /// Target URL to scan (also the crawl scope prefix)
        #[arg(short, long)]
        target: String,

        /// Checks to run (comma-separated)
        #[arg(long, value_delimiter = ',')]
        checks: Option<Vec<String>>,

        /// Maximum number of pages to visit
        #[arg(long)]
        max_pages: Option<usize>,

        /// Maximum simultaneous crawl fetches
        #[arg(long)]
        concurrency: Option<usize>,

        /// Timeout in seconds for the initial request
        #[arg(long)]
        timeout: Option<u64>,

        /// Timeout in seconds for each crawled page
        #[arg(long)]
        crawl_timeout: Option<u64>,

        /// Output file path (default: webguard_{hostname}.json)
        #[arg(short, long)]
        output: Option<String>,

        /// Exit with code 1 if findings at or above this severity are found (high, medium, low, info)
        #[arg(long)]
        fail_on: Option<String>,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Custom headers (format: "Key: Value")
        #[arg(short = 'H', long)]
        header: Option<Vec<String>>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List available checks
    Checks,

    /// Print the summary of a previous scan's JSON output
    Report {
        /// Path to the JSON report
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "webguard=debug"
    } else {
        "webguard=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn output_name_from_target(target: &str) -> String {
    if let Ok(url) = Url::parse(target) {
        let host = url.host_str().unwrap_or("unknown");
        let sanitized: String = host
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect();
        format!("webguard_{sanitized}.json")
    } else {
        "webguard_report.json".to_string()
    }
}

fn print_banner() {
    let banner = r#"
    ╔═══════════════════════════════════════╗
    ║  WEBGUARD v0.1.0                      ║
    ║  Web Application Security Scanner     ║
    ╚═══════════════════════════════════════╝
    "#;
    println!("{}", banner.cyan());
}

fn print_summary(report: &ScanReport) {
    let severities = [
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    println!("\n{}", "  Scan Summary".bold());
    println!("  {}", "─".repeat(35));
    println!("  {}", report.summary);

    if report.is_failed() {
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Severity", "Count"]);
    for severity in &severities {
        builder.push_record([
            severity.to_string(),
            report.count_by_severity(*severity).to_string(),
        ]);
    }
    builder.push_record([
        "Total".to_string(),
        report.vulnerabilities.len().to_string(),
    ]);

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");

    for finding in &report.vulnerabilities {
        print_finding(finding);
    }

    println!(
        "\n  {} pages crawled, {} requests",
        report.pages_crawled, report.total_requests
    );
}

fn print_finding(finding: &Finding) {
    println!(
        "  {} {} {} {}",
        format!("[{}]", finding.severity)
            .color(finding.severity.color())
            .bold(),
        finding.name,
        format!("({})", finding.parameter).dimmed(),
        finding.url.dimmed(),
    );
}

fn spinner(target: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Scanning {target}..."));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            target,
            checks,
            max_pages,
            concurrency,
            timeout,
            crawl_timeout,
            output,
            fail_on,
            config: config_path,
            header,
            verbose,
        } => {
            init_tracing(verbose);
            print_banner();

            let mut scan_config = if let Some(ref path) = config_path {
                config::load_config(path)?
            } else {
                let default_path = Path::new("config/default.toml");
                if default_path.exists() {
                    config::load_config(default_path)?
                } else {
                    ScanConfig::default()
                }
            };

            config::merge_cli_args(
                &mut scan_config,
                target,
                max_pages,
                concurrency,
                timeout,
                crawl_timeout,
                checks,
                header,
            );

            let fail_severity = match fail_on.as_deref() {
                Some(value) => match Severity::parse(value) {
                    Some(severity) => Some(severity),
                    None => {
                        eprintln!(
                            "  {} Invalid --fail-on value: '{}'. Use: high, medium, low, info",
                            "Error:".red().bold(),
                            value
                        );
                        std::process::exit(2);
                    }
                },
                None => None,
            };

            println!("  {} {}", "Target:".bold(), scan_config.target.green());
            println!(
                "  {} {}",
                "Checks:".bold(),
                scan_config.checks.join(", ").cyan()
            );
            println!(
                "  {} {} pages, {} concurrent\n",
                "Budget:".bold(),
                scan_config.max_pages.to_string().cyan(),
                scan_config.concurrency.to_string().cyan()
            );

            let engine = ScanEngine::with_defaults();
            let pb = spinner(&scan_config.target);
            let result = engine.run_scan(&scan_config).await;
            pb.finish_and_clear();

            print_summary(&result);

            let output_file =
                output.unwrap_or_else(|| output_name_from_target(&scan_config.target));
            report::json::export(&result, Path::new(&output_file))?;
            println!("\n  {} {}", "Report saved to:".bold(), output_file.green());

            if result.is_failed() {
                std::process::exit(1);
            }

            if let Some(threshold) = fail_severity {
                if result.vulnerabilities.iter().any(|f| f.severity <= threshold) {
                    println!(
                        "\n  {} Findings at or above {} severity detected.",
                        "FAIL:".red().bold(),
                        threshold.to_string().to_uppercase().red()
                    );
                    std::process::exit(1);
                }
            }
        }

        Commands::Checks => {
            print_banner();
            let engine = ScanEngine::with_defaults();

            println!("  {}\n", "Available Checks:".bold());
            for (name, description) in engine.list_checks() {
                println!("    {} {}", format!("{name:12}").cyan().bold(), description);
            }
            println!();
        }

        Commands::Report { input } => {
            init_tracing(false);
            print_banner();

            let result = report::json::load(&input)?;
            println!("  {} {}", "Target:".bold(), result.target_url.green());
            println!("  {} {}", "Date:".bold(), result.scan_date.to_rfc3339());
            print_summary(&result);
        }
    }

    Ok(())
}
