mod cache;
mod error;
mod parser;
mod session;
mod settings;
mod source;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use cache::PageCache;
use parser::fields::FieldValue;
use parser::PageReport;
use session::{Credentials, SiteSource};
use source::{CachedSource, CalendarSource};

#[derive(Parser)]
#[command(name = "mp_calendar", about = "Master Planner events calendar scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, fetch the calendar and print its events
    Run {
        /// First day (YYYY-MM-DD, default: today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD, default: twelve months after --from)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Ignore the cached page and fetch again
        #[arg(long)]
        refresh: bool,
        /// Neither read nor write the cache
        #[arg(long, conflicts_with = "refresh")]
        no_cache: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse a saved calendar page
    Parse {
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Delete the cached calendar page
    ClearCache,
}

#[derive(Args)]
struct OutputArgs {
    /// Print events as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = settings::init()?;

    match cli.command {
        Commands::Run {
            from,
            to,
            refresh,
            no_cache,
            output,
        } => {
            let (default_from, default_to) =
                source::default_range(from.unwrap_or_else(|| Local::now().date_naive()));
            let (from, to) = (default_from, to.unwrap_or(default_to));

            let credentials = Credentials::load(&settings.credentials_path)?;
            let site = SiteSource::new(settings, credentials)?;
            let cache = PageCache::new(&settings.cache_path);

            let html = if no_cache {
                site.fetch(from, to)?
            } else {
                if refresh {
                    cache.clear()?;
                }
                CachedSource::new(site, cache).fetch(from, to)?
            };

            let report = parser::process_page(&html, &settings.selectors)?;
            print_report(&report, output.json)?;
        }
        Commands::Parse { file, output } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let report = parser::process_page(&html, &settings.selectors)?;
            print_report(&report, output.json)?;
        }
        Commands::ClearCache => {
            let cache = PageCache::new(&settings.cache_path);
            if cache.clear()? {
                println!("Removed {}", settings.cache_path.display());
            } else {
                println!("No cached page at {}", settings.cache_path.display());
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn print_report(report: &PageReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&report.events)?);
    } else if report.events.is_empty() {
        println!("No events found.");
    } else {
        println!(
            "{:<10} | {:<28} | {:<36} | {:<22} | {:<10}",
            "Date", "Organization", "Event", "Venue", "Time"
        );
        println!("{}", "-".repeat(118));

        for e in &report.events {
            let time = match e.fields.get("start_time") {
                Some(FieldValue::Text(t)) => t.as_str(),
                _ => "",
            };
            println!(
                "{:<10} | {:<28} | {:<36} | {:<22} | {:<10}",
                e.date,
                truncate(&e.organization, 28),
                truncate(&e.name, 36),
                truncate(e.venue.as_deref().unwrap_or("-"), 22),
                time
            );
        }
        println!("\n{} events", report.events.len());
    }

    if !report.diagnostics.is_empty() {
        eprintln!("\n--- {} warnings ---", report.diagnostics.len());
        for d in &report.diagnostics {
            eprintln!("  {}", d);
        }
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
