//! Bot configuration from flags and environment

use anyhow::{Context, Result};
use clap::Args;
use moments_relay::config::Settings;
use moments_relay::types::{RepoConfig, UserId};
use std::time::Duration;

/// Upper bound for `--auto-publish-secs` (one day)
const MAX_AUTO_PUBLISH_SECS: u64 = 24 * 60 * 60;

/// Settings shared by every subcommand; each flag has an environment variable
#[derive(Args, Debug, Clone)]
pub struct BotArgs {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, global = true)]
    pub telegram_token: Option<String>,

    /// The only Telegram user id the bot answers
    #[arg(long, env = "TELEGRAM_USER_ID", global = true)]
    pub telegram_user_id: Option<UserId>,

    /// Owner of the GitHub repositories
    #[arg(long, env = "GITHUB_USERNAME", global = true)]
    pub github_username: Option<String>,

    /// Repository where records are created as issues
    #[arg(long, env = "GITHUB_REPO", default_value = "moments", global = true)]
    pub github_repo: String,

    /// Repository where media files are stored
    #[arg(long, env = "GITHUB_FILE_REPO", default_value = "moments-files", global = true)]
    pub github_file_repo: String,

    /// User-Agent sent to the GitHub API
    #[arg(long, env = "GITHUB_USER_AGENT", default_value = "moments-bot/1.0", global = true)]
    pub github_user_agent: String,

    /// GitHub Enterprise host (github.com when unset)
    #[arg(long, env = "GITHUB_HOST", global = true)]
    pub github_host: Option<String>,

    /// Seconds between picking a label and auto-publishing media
    #[arg(
        long,
        env = "AUTO_PUBLISH_SECS",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(..=MAX_AUTO_PUBLISH_SECS),
        global = true
    )]
    pub auto_publish_secs: u64,

    /// Seconds the label list is cached
    #[arg(long, env = "LABEL_CACHE_SECS", default_value_t = 1800, global = true)]
    pub label_cache_secs: u64,
}

impl BotArgs {
    /// Bot token, required to talk to Telegram
    pub fn telegram_token(&self) -> Result<String> {
        self.telegram_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .context("TELEGRAM_BOT_TOKEN is not set")
    }

    /// Relay settings for the configured owner
    pub fn settings(&self) -> Result<Settings> {
        let owner_id = self
            .telegram_user_id
            .context("TELEGRAM_USER_ID is not set")?;

        let mut settings = Settings::new(owner_id);
        settings.auto_publish_delay = Duration::from_secs(self.auto_publish_secs);
        settings.label_ttl = Duration::from_secs(self.label_cache_secs);
        Ok(settings)
    }

    /// Where records and files live
    pub fn repo_config(&self) -> Result<RepoConfig> {
        let owner = self
            .github_username
            .clone()
            .filter(|o| !o.trim().is_empty())
            .context("GITHUB_USERNAME is not set")?;

        Ok(RepoConfig {
            owner,
            repo: self.github_repo.clone(),
            file_repo: self.github_file_repo.clone(),
            host: self.github_host.clone().filter(|h| !h.trim().is_empty()),
        })
    }
}
