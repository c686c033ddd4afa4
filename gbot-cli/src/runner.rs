//! Wires the bot together and drives the teloxide long-polling loop: commands
//! are answered directly, everything else runs through the handler chain in a
//! spawned task so users do not block each other.

use crate::adapters::TelegramMessageWrapper;
use crate::commands::{handle_command, Command, CommandContext};
use crate::config::BotConfig;
use crate::photos::{PhotoHandler, PhotoUploader};
use anyhow::Result;
use gbot_core::{init_tracing, ChatApi, TelegramChat, ToCoreMessage};
use handler_chain::HandlerChain;
use history::HistoryStore;
use middleware::{LoggingMiddleware, RegistrationMiddleware};
use openai_client::{OpenAIClient, PriceTable};
use pipeline::{Dispatcher, GptHandler, SessionRegistry};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, instrument};

/// Main entry: init logging, validate config, build the chain, run long polling.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    if let Some(log_dir) = std::path::Path::new(&config.log_file).parent() {
        std::fs::create_dir_all(log_dir)?;
    }
    init_tracing(&config.log_file)?;

    info!(
        model = %config.model_name,
        history_dir = %config.history_dir,
        "Initializing bot"
    );

    let bot = Bot::new(config.bot_token.clone());
    let chat_api: Arc<dyn ChatApi> = Arc::new(TelegramChat::new(bot.clone()));

    let history = HistoryStore::new(&config.history_dir);
    let backend = Arc::new(OpenAIClient::new(config.openai_api_key.clone()));
    let dispatcher = Dispatcher::new(backend, PriceTable::builtin(), config.model_name.clone());
    let gpt = Arc::new(GptHandler::new(
        chat_api.clone(),
        history.clone(),
        dispatcher,
        SessionRegistry::new(),
    ));

    let uploader = config.base_url.clone().map(PhotoUploader::new);
    let photo_handler = PhotoHandler::new(bot.clone(), chat_api.clone(), uploader, gpt.clone());

    let chain = HandlerChain::new()
        .add_middleware(Arc::new(LoggingMiddleware))
        .add_middleware(Arc::new(RegistrationMiddleware::new(
            &config.users_dir,
            config.register_url.clone(),
        )))
        .add_handler(Arc::new(photo_handler))
        .add_handler(gpt);

    let command_ctx = Arc::new(CommandContext {
        history,
        users_dir: config.users_dir.clone().into(),
        admin_telegram_id: config.admin_telegram_id,
    });

    let bot_username = match bot.get_me().await {
        Ok(me) => me.user.username.clone().unwrap_or_default(),
        Err(e) => {
            error!(error = %e, "get_me failed, command mention parsing degraded");
            String::new()
        }
    };

    info!(username = %bot_username, "Bot started successfully");

    teloxide::repl(bot, move |bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();
        let command_ctx = command_ctx.clone();
        let bot_username = bot_username.clone();

        async move {
            if let Some(text) = msg.text() {
                if let Ok(cmd) = Command::parse(text, &bot_username) {
                    if let Err(e) = handle_command(&bot, &msg, cmd, &command_ctx).await {
                        error!(error = %e, "Command handler failed");
                    }
                    return Ok(());
                }
            }

            let core_msg = TelegramMessageWrapper(&msg).to_core();
            // Each update runs in its own task; the per-user session registry
            // keeps one user's dispatches serial while users stay independent.
            tokio::spawn(async move {
                if let Err(e) = chain.handle(&core_msg).await {
                    error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
