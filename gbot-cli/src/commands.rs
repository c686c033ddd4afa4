//! Bot commands: /start greeting, /profile usage summary, /users admin listing.

use anyhow::Result;
use chrono::{DateTime, Local};
use history::HistoryStore;
use std::path::PathBuf;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::{info, instrument, warn};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Mavjud buyruqlar:")]
pub enum Command {
    #[command(description = "botni ishga tushirish")]
    Start,
    #[command(description = "profil va oylik sarf")]
    Profile,
    #[command(description = "foydalanuvchilar ro'yxati (admin)")]
    Users,
}

/// Everything the command handlers need besides the bot itself.
pub struct CommandContext {
    pub history: HistoryStore,
    pub users_dir: PathBuf,
    pub admin_telegram_id: Option<i64>,
}

#[instrument(skip(bot, msg, ctx))]
pub async fn handle_command(
    bot: &Bot,
    msg: &teloxide::types::Message,
    cmd: Command,
    ctx: &CommandContext,
) -> Result<()> {
    match cmd {
        Command::Start => start(bot, msg).await,
        Command::Profile => profile(bot, msg, ctx).await,
        Command::Users => users(bot, msg, ctx).await,
    }
}

async fn start(bot: &Bot, msg: &teloxide::types::Message) -> Result<()> {
    let first_name = msg
        .from
        .as_ref()
        .map(|u| u.first_name.clone())
        .unwrap_or_default();

    bot.send_message(
        msg.chat.id,
        format!(
            "👋 Assalamu alaykum {}!\n\n\
             Men sun'iy intellekt asosida ishlaydigan chat botman.\n\
             Hozircha matnli xabarlar va rasmlarga javob bera olaman.\n\n\
             Savoling bormi yoki rasm yubormoqchisan? Marhamat, yozaver 😉",
            first_name
        ),
    )
    .await?;
    Ok(())
}

async fn profile(
    bot: &Bot,
    msg: &teloxide::types::Message,
    ctx: &CommandContext,
) -> Result<()> {
    let user = msg.from.as_ref();
    let user_id = user.map(|u| u.id.0 as i64).unwrap_or(0);
    let first_name = user
        .map(|u| u.first_name.clone())
        .unwrap_or_else(|| "Nomaʼlum".to_string());

    let now = Local::now();
    let usage = ctx.history.monthly_usage(user_id, now);
    let month_name = now.format("%B");

    let mut usage_line = format!("<b>- {}:</b> ${:.3}", month_name, usage.total_cost);
    if usage.message_count > 0 {
        usage_line.push_str(&format!(", jami {} ta xabar", usage.message_count));
    }

    bot.send_message(
        msg.chat.id,
        format!(
            "<blockquote>👤 <b>Profil</b></blockquote>\n\
             <b>- Ism:</b> {}\n\
             <b>- Holat:</b> 🟢 Faol\n\n\
             <blockquote>💰 <b>Hisob-kitob</b></blockquote>\n\
             {}",
            first_name, usage_line
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

async fn users(
    bot: &Bot,
    msg: &teloxide::types::Message,
    ctx: &CommandContext,
) -> Result<()> {
    let user_id = msg.from.as_ref().map(|u| u.id.0 as i64).unwrap_or(0);
    if ctx.admin_telegram_id != Some(user_id) {
        info!(user_id = user_id, "Ignoring /users from non-admin");
        return Ok(());
    }

    if !ctx.users_dir.exists() {
        bot.send_message(msg.chat.id, "❌ 'users' directory not found.")
            .await?;
        return Ok(());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(&ctx.users_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut response = format!("👥 Total registered users: {}", files.len());

    let now = Local::now();
    let preview: Vec<String> = files
        .iter()
        .take(10)
        .map(|path| match read_registered_user(path) {
            Ok((id, username)) => user_summary_line(&ctx.history, id, &username, now),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read user record");
                format!("• Error reading {}: {}", path.display(), e)
            }
        })
        .collect();

    if !preview.is_empty() {
        response.push_str("\n\n📋 User usage:\n");
        response.push_str(&preview.join("\n"));
    }

    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

fn read_registered_user(path: &std::path::Path) -> Result<(i64, String)> {
    let record: middleware::UserRecord =
        serde_json::from_str(&std::fs::read_to_string(path)?)?;
    Ok((record.telegram_id, record.username))
}

/// One /users preview line: handle (or id), month cost and message count.
pub fn user_summary_line(
    history: &HistoryStore,
    user_id: i64,
    username: &str,
    now: DateTime<Local>,
) -> String {
    let usage = history.monthly_usage(user_id, now);
    let display = if username.is_empty() {
        format!("ID: {}", user_id)
    } else {
        format!("@{}", username)
    };
    format!(
        "• {}: ${:.3}, {} ta xabar",
        display, usage.total_cost, usage.message_count
    )
}
