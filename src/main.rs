use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use booker_tester::report::{self, NotificationDispatcher, RunAggregator, RunObserver};
use booker_tester::utils::config::ServiceConfig;
use booker_tester::{fixture, scenario};

#[derive(Parser)]
#[command(name = "booker-tester")]
#[command(author = "NL Team")]
#[command(version = "0.1.0")]
#[command(about = "Data-driven API test automation CLI with chat notifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the booking scenarios driven by a fixture CSV
    Run {
        /// Path to the fixture CSV
        #[arg(short, long, default_value = "testdata/bookings.csv")]
        data: PathBuf,

        /// Booking service base URL (defaults to BOOKER_BASE_URL or the demo service)
        #[arg(short, long)]
        base_url: Option<String>,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Maximum scenarios in flight
        #[arg(short, long, default_value = "4")]
        concurrency: usize,

        /// Generate reports (JSON, JUnit)
        #[arg(long, default_value = "false")]
        report: bool,

        /// Post the run summary to configured chat webhooks
        #[arg(long, default_value = "false")]
        notify: bool,
    },

    /// Write a sample fixture CSV
    GenerateData {
        /// Output file path
        #[arg(short, long, default_value = "testdata/bookings.csv")]
        output: PathBuf,

        /// Number of extra randomized rows
        #[arg(short, long, default_value = "0")]
        extra: usize,
    },

    /// Forward a results JSON file to an n8n webhook
    Forward {
        /// Webhook URL (defaults to N8N_WEBHOOK_URL)
        #[arg(long)]
        url: Option<String>,

        /// Results file (defaults to PLAYWRIGHT_RESULTS or playwright-report/results.json)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Post a canned test message to the Slack webhook
    CheckWebhook {
        /// Webhook URL (defaults to SLACK_WEBHOOK_URL)
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            base_url,
            output,
            concurrency,
            report: write_reports,
            notify,
        } => {
            let config = ServiceConfig::resolve(base_url.as_deref());
            println!(
                "{} Running booking scenarios from: {}",
                "▶".green().bold(),
                data.display()
            );
            println!("  Service: {}", config.base_url.cyan());
            println!("  Concurrency: {}", concurrency.to_string().cyan());
            if write_reports {
                println!("  Reports: {}", "Enabled".green());
            }
            if notify {
                println!("  Notifications: {}", "Enabled".green());
            }

            // A missing fixture file aborts the suite before anything runs.
            let rows = fixture::load_rows(&data)?;
            println!("  Scenarios: {}\n", rows.len().to_string().cyan());

            let session_id = uuid::Uuid::new_v4().to_string();
            let aggregator = Arc::new(RunAggregator::new(&session_id));
            let outcomes = scenario::run_all(
                rows,
                config,
                concurrency,
                aggregator.clone() as Arc<dyn RunObserver>,
            )
            .await;
            let run_report = aggregator.end();

            let summary = &run_report.summary;
            println!("\n{} Run finished", "■".blue().bold());
            println!(
                "  {} passed, {} failed, {} skipped",
                summary.passed.to_string().green(),
                summary.failed.to_string().red(),
                summary.skipped.to_string().yellow()
            );
            println!("  Duration: {}ms", summary.duration_ms);

            if write_reports {
                std::fs::create_dir_all(&output)?;
                report::json::generate(&run_report, Some(&output.join("results.json")))?;
                report::junit::generate(&session_id, &outcomes, Some(&output.join("junit.xml")))?;
            }

            if notify {
                // Delivery failures are logged inside the dispatcher and never
                // turn into a run failure.
                NotificationDispatcher::from_env().dispatch(&run_report).await;
            }

            if summary.failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::GenerateData { output, extra } => {
            fixture::write_sample_csv(&output, extra)?;
            println!(
                "{} Wrote sample test data to {}",
                "✓".green(),
                output.display().to_string().cyan()
            );
        }

        Commands::Forward { url, file } => {
            if let Err(e) = report::forward::forward(url.as_deref(), file.as_deref()).await {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(e.exit_code());
            }
            println!("{} Results sent to n8n successfully", "✓".green());
        }

        Commands::CheckWebhook { url } => {
            let url = url
                .or_else(|| std::env::var("SLACK_WEBHOOK_URL").ok())
                .filter(|u| !u.is_empty());
            let Some(url) = url else {
                eprintln!(
                    "{} No Slack webhook URL provided. Pass --url or set SLACK_WEBHOOK_URL",
                    "Error:".red().bold()
                );
                std::process::exit(1);
            };
            println!("Testing Slack webhook...");
            match report::notify::check_webhook(&url).await {
                Ok(()) => println!("{} Slack webhook is working correctly", "✓".green()),
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
