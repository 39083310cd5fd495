//! Command-line interface definitions for Banner Watch.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every credential and most options can also come from environment variables
//! (a `.env` file is loaded before parsing), so a scheduled CI job only needs
//! to export secrets.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Banner Watch application.
///
/// Parsed once in `main` and resolved into a [`crate::config::Config`];
/// nothing else in the crate looks at the CLI or the environment.
///
/// # Examples
///
/// ```sh
/// # One page, Telegram only
/// TELEGRAM_TOKEN=... TELEGRAM_CHAT_ID=... banner_watch -u https://shop.example.com/
///
/// # Several pages from a YAML file, email only, stay quiet when nothing is found
/// GMAIL_USER=me@example.com GMAIL_APP_PASSWORD=... banner_watch -c watch.yaml --quiet-when-empty
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Page to check; repeat the flag or separate URLs with commas
    #[arg(short, long = "url", env = "WATCH_URLS", value_delimiter = ',')]
    pub urls: Vec<String>,

    /// Optional path to a YAML file with targets and behaviour settings
    #[arg(short, long, env = "WATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Telegram bot token; the messaging channel is disabled without it
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram chat id that receives the report
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = "https://api.telegram.org")]
    pub telegram_api_base: String,

    /// Mail account used to log in to the SMTP relay and as the sender
    #[arg(long, env = "GMAIL_USER")]
    pub mail_user: Option<String>,

    /// Application password for the mail account; the email channel is disabled without it
    #[arg(long, env = "GMAIL_APP_PASSWORD", hide_env_values = true)]
    pub mail_app_password: Option<String>,

    /// Report recipient (defaults to the mail account)
    #[arg(long, env = "RECIPIENT_EMAIL")]
    pub mail_recipient: Option<String>,

    /// SMTP relay host (implicit TLS)
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// SMTP relay port
    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,

    /// Prefix for email subject lines
    #[arg(long, env = "SUBJECT_PREFIX")]
    pub subject_prefix: Option<String>,

    /// User-Agent sent by the basic fetch
    #[arg(long, env = "WATCH_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Timeout for the basic HTTP fetch, in seconds
    #[arg(long, default_value_t = 15)]
    pub http_timeout_secs: u64,

    /// Timeout for browser navigation, in seconds
    #[arg(long, default_value_t = 30)]
    pub nav_timeout_secs: u64,

    /// Time to let dynamic content settle after navigation, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub settle_millis: u64,

    /// Skip the headless-browser fallback entirely
    #[arg(long)]
    pub no_render: bool,

    /// Launch Chromium with --no-sandbox (needed in most containers)
    #[arg(long, env = "BROWSER_NO_SANDBOX")]
    pub browser_no_sandbox: bool,

    /// Chromium/Chrome executable to use instead of auto-detection
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Do not send a report when a page shows no offers
    #[arg(long, env = "QUIET_WHEN_EMPTY")]
    pub quiet_when_empty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "banner_watch",
            "--url",
            "https://a.example",
            "--telegram-token",
            "123:abc",
            "--telegram-chat-id",
            "42",
            "--no-render",
        ]);

        assert_eq!(cli.urls, vec!["https://a.example"]);
        assert_eq!(cli.telegram_token.as_deref(), Some("123:abc"));
        assert_eq!(cli.telegram_chat_id.as_deref(), Some("42"));
        assert!(cli.no_render);
        assert_eq!(cli.http_timeout_secs, 15);
        assert_eq!(cli.nav_timeout_secs, 30);
        assert_eq!(cli.settle_millis, 2000);
    }

    #[test]
    fn test_cli_short_flags_and_delimiter() {
        let cli = Cli::parse_from([
            "banner_watch",
            "-u",
            "https://a.example,https://b.example",
            "-u",
            "https://c.example",
            "-c",
            "/tmp/watch.yaml",
        ]);

        assert_eq!(
            cli.urls,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/watch.yaml")));
    }

    #[test]
    fn test_cli_smtp_overrides() {
        let cli = Cli::parse_from([
            "banner_watch",
            "-u",
            "https://a.example",
            "--smtp-host",
            "mail.example.com",
            "--smtp-port",
            "2465",
        ]);

        assert_eq!(cli.smtp_host, "mail.example.com");
        assert_eq!(cli.smtp_port, 2465);
    }

    #[test]
    fn test_mail_settings_read_gmail_env_names() {
        use clap::CommandFactory;

        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|env| env.to_str())
                .map(str::to_string)
        };

        assert_eq!(env_of("mail_user").as_deref(), Some("GMAIL_USER"));
        assert_eq!(env_of("mail_app_password").as_deref(), Some("GMAIL_APP_PASSWORD"));
        assert_eq!(env_of("mail_recipient").as_deref(), Some("RECIPIENT_EMAIL"));
    }
}
