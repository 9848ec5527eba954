//! Outdoor/Nature Job Scraper
//!
//! Scrapes outdoor and nature jobs around Tampa Bay, saves them to
//! `outdoor_jobs_<timestamp>.json` and emails a digest through Gmail.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use job_scraper::config::MISSING_EMAIL_HELP;
use job_scraper::{
    pipeline, sources, Aggregator, Cli, Config, ConfigError, Fetcher, LogContext, RetryPolicy,
};
use mailer::GmailMailer;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(ConfigError::MissingEmail) => {
            println!("{}", MISSING_EMAIL_HELP);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    let logs = LogContext::init(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;

    let result = run(&config);
    if let Err(e) = &result {
        error!("Error in main execution: {:#}", e);
    }

    logs.shutdown();
    result
}

fn run(config: &Config) -> Result<()> {
    info!("Starting outdoor job scraping for Tampa Bay area...");
    if config.demo_mode {
        info!("Demo mode: sample listings will stand in for an empty run");
    }

    let fetcher = Fetcher::http(RetryPolicy::default()).context("Failed to build HTTP client")?;
    let aggregator = Aggregator::with_sources(fetcher, sources::all_sources())
        .context("Invalid source descriptor")?
        .with_sample_fallback(config.demo_mode);

    let jobs = aggregator.run();

    let now = Local::now().naive_local();
    let output = pipeline::prepare(&jobs, &config.output_dir, now)
        .context("Failed to save jobs snapshot")?;

    let Some(digest) = output.digest else {
        warn!("No jobs found. Email not sent.");
        return Ok(());
    };

    if config.dry_run {
        pipeline::write_preview(&digest, &config.output_dir, now)
            .context("Failed to write digest preview")?;
        info!("Dry run: email not sent");
        return Ok(());
    }

    let mut gmail = GmailMailer::new(config.credentials_file.clone(), config.token_file.clone())
        .context("Failed to build mail client")?;
    gmail.authenticate().context("Gmail authentication failed")?;
    pipeline::deliver(&mut gmail, &digest, &config.email_address)
        .context("Failed to send email")?;

    info!("Job scraping and email sending completed successfully!");
    Ok(())
}
