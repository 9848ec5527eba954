use clap::Parser;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const MISSING_EMAIL_HELP: &str = "\
ERROR: EMAIL_ADDRESS not found!

Please set your email address using one of these methods:
1. Environment variable: export EMAIL_ADDRESS='your.email@gmail.com'
2. Create a .env file with: EMAIL_ADDRESS=your.email@gmail.com
3. Copy env.example to .env and edit it

Example:
  Windows: set EMAIL_ADDRESS=your.email@gmail.com
  Linux/Mac: export EMAIL_ADDRESS=your.email@gmail.com";

/// Scrape outdoor/nature jobs around Tampa Bay and email a digest.
#[derive(Debug, Default, Parser)]
#[command(name = "outdoor-jobs", version)]
pub struct Cli {
    /// Use the sample listings when every source comes back empty
    #[arg(long)]
    pub demo: bool,

    /// Write the snapshot and an HTML preview, but do not send email
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for the JSON snapshot (overrides OUTPUT_DIR)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("EMAIL_ADDRESS must be set")]
    MissingEmail,

    #[error("{name} must be a boolean, got `{value}`")]
    InvalidBool { name: &'static str, value: String },
}

/// Run configuration: CLI flags layered over environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub email_address: String,
    pub demo_mode: bool,
    pub dry_run: bool,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub credentials_file: PathBuf,
    pub token_file: PathBuf,
}

impl Config {
    /// Loads `.env` if present, then resolves against the process environment.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::resolve(cli, |key| env::var(key).ok())
    }

    pub fn resolve(
        cli: &Cli,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let email_address = lookup("EMAIL_ADDRESS")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEmail)?;

        let demo_mode = match lookup("DEMO_MODE") {
            Some(value) => cli.demo || parse_bool("DEMO_MODE", &value)?,
            None => cli.demo,
        };

        let path = |key: &str, default: &str| {
            lookup(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Ok(Self {
            email_address,
            demo_mode,
            dry_run: cli.dry_run,
            output_dir: cli
                .output_dir
                .clone()
                .unwrap_or_else(|| path("OUTPUT_DIR", ".")),
            log_file: path("LOG_FILE", "job_scraper.log"),
            credentials_file: path("GMAIL_CREDENTIALS_FILE", "credentials.json"),
            token_file: path("GMAIL_TOKEN_FILE", "token.json"),
        })
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(cli: &Cli, vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::resolve(cli, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_email() {
        assert!(matches!(
            resolve(&Cli::default(), &[]),
            Err(ConfigError::MissingEmail)
        ));
        assert!(matches!(
            resolve(&Cli::default(), &[("EMAIL_ADDRESS", "  ")]),
            Err(ConfigError::MissingEmail)
        ));
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&Cli::default(), &[("EMAIL_ADDRESS", "me@example.com")]).unwrap();
        assert_eq!(config.email_address, "me@example.com");
        assert!(!config.demo_mode);
        assert!(!config.dry_run);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.log_file, PathBuf::from("job_scraper.log"));
        assert_eq!(config.credentials_file, PathBuf::from("credentials.json"));
        assert_eq!(config.token_file, PathBuf::from("token.json"));
    }

    #[test]
    fn test_demo_mode_from_env_or_flag() {
        let from_env = resolve(
            &Cli::default(),
            &[("EMAIL_ADDRESS", "me@example.com"), ("DEMO_MODE", "true")],
        )
        .unwrap();
        assert!(from_env.demo_mode);

        let cli = Cli {
            demo: true,
            ..Cli::default()
        };
        let from_flag = resolve(&cli, &[("EMAIL_ADDRESS", "me@example.com")]).unwrap();
        assert!(from_flag.demo_mode);
    }

    #[test]
    fn test_invalid_demo_mode() {
        let err = resolve(
            &Cli::default(),
            &[("EMAIL_ADDRESS", "me@example.com"), ("DEMO_MODE", "sometimes")],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { name: "DEMO_MODE", .. }));
    }

    #[test]
    fn test_cli_output_dir_overrides_env() {
        let cli = Cli {
            output_dir: Some(PathBuf::from("runs")),
            ..Cli::default()
        };
        let config = resolve(
            &cli,
            &[("EMAIL_ADDRESS", "me@example.com"), ("OUTPUT_DIR", "data")],
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("runs"));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["outdoor-jobs", "--demo", "--dry-run", "--output-dir", "out"]);
        assert!(cli.demo);
        assert!(cli.dry_run);
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
    }
}
