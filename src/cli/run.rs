//! Run command - long-poll Telegram and feed the relay

use crate::cli::BotArgs;
use anyhow::Result;
use moments_relay::platform::create_record_service;
use moments_relay::relay::{Dispatcher, Relay};
use moments_relay::transport::TelegramClient;
use moments_relay::transport::telegram::{Update, classify_update};
use std::sync::Arc;
use std::time::Duration;

/// Long-poll timeout passed to `getUpdates`
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Start the bot and run until Ctrl-C
pub async fn run_bot(args: &BotArgs) -> Result<()> {
    let token = args.telegram_token()?;
    let settings = args.settings()?;
    let repo = args.repo_config()?;

    let records = create_record_service(&repo, &args.github_user_agent).await?;
    let telegram = Arc::new(TelegramClient::new(token));
    let me = telegram.get_me().await?;

    tracing::info!(
        bot = me.username.as_deref().unwrap_or(me.first_name.as_str()),
        owner = settings.owner_id,
        repo = %format!("{}/{}", repo.owner, repo.repo),
        "bot started"
    );

    let relay = Relay::new(
        settings,
        records,
        Arc::clone(&telegram) as _,
        Arc::clone(&telegram) as _,
    );
    let dispatcher = Dispatcher::new(Arc::clone(&relay));
    receive_loop(&telegram, &relay, &dispatcher).await;

    tracing::info!("draining queued events");
    dispatcher.shutdown().await;
    tracing::info!("bot stopped");
    Ok(())
}

async fn receive_loop(telegram: &Arc<TelegramClient>, relay: &Relay, dispatcher: &Dispatcher) {
    let mut offset: Option<i64> = None;

    loop {
        let polled = tokio::select! {
            _ = tokio::signal::ctrl_c() => return,
            polled = telegram.get_updates(offset, POLL_TIMEOUT_SECS) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "polling failed");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            route(telegram, relay, dispatcher, &update);
        }
    }
}

/// Acknowledge owner button presses and queue the update for the relay
fn route(
    telegram: &Arc<TelegramClient>,
    relay: &Relay,
    dispatcher: &Dispatcher,
    update: &Update,
) {
    if let Some(query) = update
        .callback_query
        .as_ref()
        .filter(|q| relay.is_authorized(q.from.id))
    {
        let telegram = Arc::clone(telegram);
        let query_id = query.id.clone();
        tokio::spawn(async move {
            if let Err(e) = telegram.answer_callback_query(&query_id).await {
                tracing::debug!(error = %e, "failed to answer callback query");
            }
        });
    }

    match classify_update(update) {
        Some(event) => dispatcher.dispatch(event),
        None => tracing::debug!(update_id = update.update_id, "ignoring unsupported update"),
    }
}
