//! Runtime configuration, resolved once at startup.
//!
//! Sources, highest priority first:
//! 1. command-line flags and environment variables (see [`crate::cli`])
//! 2. an optional YAML file (`--config`) holding targets and behaviour
//!    settings, never credentials
//! 3. built-in defaults
//!
//! A channel whose credentials are missing or empty is simply `None`; the
//! dispatcher logs that once per cycle.

use crate::cli::Cli;
use crate::error::WatchError;
use itertools::Itertools;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; BannerWatch/1.0)";
pub const DEFAULT_SUBJECT_PREFIX: &str = "Banner Watch";

/// Settings for the basic HTTP tier.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

/// Settings for the headless-browser tier.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub enabled: bool,
    pub nav_timeout: Duration,
    pub settle_delay: Duration,
    pub no_sandbox: bool,
    pub chrome_path: Option<PathBuf>,
}

/// Telegram Bot API channel.
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// SMTP email channel.
#[derive(Clone)]
pub struct MailConfig {
    pub user: String,
    pub app_password: String,
    pub recipient: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("user", &self.user)
            .field("app_password", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

/// Everything a check cycle needs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pages to check, in order, without duplicates.
    pub targets: Vec<String>,
    pub telegram: Option<TelegramConfig>,
    pub mail: Option<MailConfig>,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    /// Send a report even when a page shows no offers.
    pub notify_when_empty: bool,
    pub subject_prefix: String,
}

/// Shape of the optional YAML file.
///
/// ```yaml
/// targets:
///   - https://shop.example.com/
/// quiet_when_empty: false
/// render: true
/// user_agent: "Mozilla/5.0 (compatible; BannerWatch/1.0)"
/// subject_prefix: "Shop watch"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub targets: Vec<String>,
    pub quiet_when_empty: Option<bool>,
    pub render: Option<bool>,
    pub user_agent: Option<String>,
    pub subject_prefix: Option<String>,
}

impl FileConfig {
    #[instrument(level = "info")]
    pub fn load(path: &Path) -> Result<Self, WatchError> {
        let raw = std::fs::read_to_string(path)?;
        let file: FileConfig = serde_yaml::from_str(&raw)?;
        info!(targets = file.targets.len(), "Loaded configuration file");
        Ok(file)
    }
}

impl Config {
    /// Read the optional file named by `--config` and resolve everything.
    pub fn from_cli(cli: &Cli) -> Result<Self, WatchError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI/env values over file values over defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, WatchError> {
        let targets: Vec<String> = cli
            .urls
            .iter()
            .chain(file.targets.iter())
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .unique()
            .map(str::to_string)
            .collect();
        if targets.is_empty() {
            return Err(WatchError::Config(
                "no target URLs configured (use --url, WATCH_URLS or a config file)".to_string(),
            ));
        }

        let telegram = match (non_empty(&cli.telegram_token), non_empty(&cli.telegram_chat_id)) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                token,
                chat_id,
                api_base: cli.telegram_api_base.trim_end_matches('/').to_string(),
            }),
            _ => None,
        };

        let mail = match (non_empty(&cli.mail_user), non_empty(&cli.mail_app_password)) {
            (Some(user), Some(app_password)) => Some(MailConfig {
                recipient: non_empty(&cli.mail_recipient).unwrap_or_else(|| user.clone()),
                user,
                app_password,
                smtp_host: cli.smtp_host.clone(),
                smtp_port: cli.smtp_port,
            }),
            _ => None,
        };

        let user_agent = non_empty(&cli.user_agent)
            .or(file.user_agent)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let subject_prefix = non_empty(&cli.subject_prefix)
            .or(file.subject_prefix)
            .unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.to_string());

        Ok(Self {
            targets,
            telegram,
            mail,
            fetch: FetchConfig {
                user_agent,
                timeout: Duration::from_secs(cli.http_timeout_secs),
            },
            render: RenderConfig {
                enabled: !cli.no_render && file.render.unwrap_or(true),
                nav_timeout: Duration::from_secs(cli.nav_timeout_secs),
                settle_delay: Duration::from_millis(cli.settle_millis),
                no_sandbox: cli.browser_no_sandbox,
                chrome_path: cli.chrome_path.clone(),
            },
            notify_when_empty: !(cli.quiet_when_empty || file.quiet_when_empty.unwrap_or(false)),
            subject_prefix,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["banner_watch"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_no_targets_is_config_error() {
        let err = Config::resolve(&cli(&["--no-render"]), FileConfig::default()).unwrap_err();
        assert!(matches!(err, WatchError::Config(_)));
    }

    #[test]
    fn test_targets_merge_and_dedupe() {
        let file = FileConfig {
            targets: vec![
                "https://b.example".to_string(),
                " https://a.example ".to_string(),
                "".to_string(),
            ],
            ..Default::default()
        };
        let config = Config::resolve(&cli(&["-u", "https://a.example"]), file).unwrap();
        assert_eq!(config.targets, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_recipient_defaults_to_mail_user() {
        let config = Config::resolve(
            &cli(&[
                "-u",
                "https://a.example",
                "--mail-user",
                "me@example.com",
                "--mail-app-password",
                "secret",
            ]),
            FileConfig::default(),
        )
        .unwrap();
        let mail = config.mail.unwrap();
        assert_eq!(mail.recipient, "me@example.com");
        assert_eq!(mail.smtp_host, "smtp.gmail.com");
        assert_eq!(mail.smtp_port, 465);
    }

    #[test]
    fn test_empty_credentials_disable_channels() {
        let config = Config::resolve(
            &cli(&[
                "-u",
                "https://a.example",
                "--telegram-token",
                "  ",
                "--telegram-chat-id",
                "42",
                "--mail-user",
                "me@example.com",
            ]),
            FileConfig::default(),
        )
        .unwrap();
        assert!(config.telegram.is_none());
        assert!(config.mail.is_none());
    }

    #[test]
    fn test_defaults_and_file_overrides() {
        let file = FileConfig {
            targets: vec!["https://a.example".to_string()],
            quiet_when_empty: Some(true),
            render: Some(false),
            user_agent: Some("FileAgent/1.0".to_string()),
            subject_prefix: None,
        };
        let config = Config::resolve(&cli(&["--user-agent", "CliAgent/2.0"]), file).unwrap();
        assert_eq!(config.fetch.user_agent, "CliAgent/2.0");
        assert_eq!(config.fetch.timeout, Duration::from_secs(15));
        assert!(!config.render.enabled);
        assert!(!config.notify_when_empty);
        assert_eq!(config.subject_prefix, DEFAULT_SUBJECT_PREFIX);
        assert_eq!(config.render.settle_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_always_notify_by_default() {
        let config = Config::resolve(&cli(&["-u", "https://a.example"]), FileConfig::default())
            .unwrap();
        assert!(config.notify_when_empty);
        assert!(config.render.enabled);
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_file_config_yaml() {
        let yaml = "targets:\n  - https://shop.example.com/\nquiet_when_empty: true\n";
        let file: FileConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.targets, vec!["https://shop.example.com/"]);
        assert_eq!(file.quiet_when_empty, Some(true));
        assert!(file.render.is_none());
    }

    #[test]
    fn test_file_config_rejects_credentials() {
        let yaml = "targets: []\ntelegram_token: abc\n";
        assert!(serde_yaml::from_str::<FileConfig>(yaml).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let telegram = TelegramConfig {
            token: "123:secret".to_string(),
            chat_id: "42".to_string(),
            api_base: "https://api.telegram.org".to_string(),
        };
        let rendered = format!("{telegram:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("42"));
    }
}
