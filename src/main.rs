use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{info, warn};

use fitbot::bot::{message_handler, BotContext};
use fitbot::config::BotConfig;
use fitbot::db::PgUserStore;
use fitbot::dialogue::BotDialogueState;
use fitbot::llm::{mask_token, LlmClient, OpenAiClient};
use fitbot::localization::init_localization;
use fitbot::store::{InMemoryUserStore, UserStore};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // LOG_FORMAT=json switches to structured output
    let json = std::env::var("LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting fitness assistant bot");

    init_localization()?;
    let config = BotConfig::from_env()?;

    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to PostgreSQL");
            Arc::new(PgUserStore::connect(database_url).await?)
        }
        None => {
            warn!("DATABASE_URL not set, profiles are kept in memory only");
            Arc::new(InMemoryUserStore::new())
        }
    };

    info!(
        model = %config.llm.model,
        api_key = %mask_token(&config.llm.api_key),
        "Configuring language model client"
    );
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(config.llm.clone())?);

    let ctx = Arc::new(BotContext::new(store, llm, config.chat.clone()));

    let bot = Bot::new(config.telegram_token.clone());

    info!("Bot initialized, starting dispatcher");

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<BotDialogueState>, BotDialogueState>()
        .endpoint(message_handler);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx, InMemStorage::<BotDialogueState>::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
    Ok(())
}
