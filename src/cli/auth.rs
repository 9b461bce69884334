//! Auth command - test and explain credentials

use crate::cli::BotArgs;
use anyhow::Result;
use moments_relay::auth::{get_github_auth, test_github_auth};
use moments_relay::transport::TelegramClient;

/// Check the GitHub token and, when configured, the Telegram bot token
pub async fn run_auth_test(args: &BotArgs) -> Result<()> {
    println!("Testing GitHub authentication...");
    let config = get_github_auth().await?;
    let username = test_github_auth(&config).await?;
    println!("Authenticated as: {username}");
    println!("Token source: {:?}", config.source);

    match args.telegram_token() {
        Ok(token) => {
            println!();
            println!("Testing Telegram bot token...");
            let me = TelegramClient::new(token).get_me().await?;
            match me.username {
                Some(name) => println!("Bot: @{name}"),
                None => println!("Bot: {}", me.first_name),
            }
        }
        Err(_) => println!("TELEGRAM_BOT_TOKEN not set, skipping Telegram check"),
    }
    Ok(())
}

/// Print setup instructions
pub fn run_auth_setup() {
    println!("Authentication Setup");
    println!("====================");
    println!();
    println!("GitHub (records and media):");
    println!("  Option 1: set GITHUB_SECRET, GITHUB_TOKEN or GH_TOKEN");
    println!("            (needs repo access to the record and file repositories)");
    println!("  Option 2: GitHub CLI, https://cli.github.com/, then `gh auth login`");
    println!("  For GitHub Enterprise set GITHUB_HOST to your instance hostname");
    println!();
    println!("Telegram:");
    println!("  Create a bot with @BotFather and set TELEGRAM_BOT_TOKEN");
    println!("  Set TELEGRAM_USER_ID to the only account the bot should answer");
    println!();
    println!("All settings can also live in a .env file in the working directory.");
}
