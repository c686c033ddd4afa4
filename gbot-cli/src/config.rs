//! Bot config: Telegram token, OpenAI access, quotas of the file layout, admin id.
//! Loaded from env (and .env via dotenvy in main).

use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// TELEGRAM_BOT_TOKEN
    pub bot_token: String,
    /// OPENAI_API_KEY
    pub openai_api_key: String,
    /// OPENAI_MODEL; the statically chosen model variant for every dispatch.
    pub model_name: String,
    /// BASE_URL of the backend that stores uploaded photos; photo relay is
    /// disabled when unset.
    pub base_url: Option<String>,
    /// REGISTER_URL of the external registration service; notification is
    /// skipped when unset.
    pub register_url: Option<String>,
    /// ADMIN_TELEGRAM_ID; /users is restricted to this account.
    pub admin_telegram_id: Option<i64>,
    /// HISTORY_DIR, the monthly conversation logs root.
    pub history_dir: String,
    /// USERS_DIR, the registration records directory.
    pub users_dir: String,
    /// LOG_FILE path.
    pub log_file: String,
}

impl BotConfig {
    /// Load from environment variables. `token` overrides TELEGRAM_BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("TELEGRAM_BOT_TOKEN")
                .map_err(|_| anyhow::anyhow!("TELEGRAM_BOT_TOKEN not set"))?,
        };
        let openai_api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;
        let model_name =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "o4-mini".to_string());
        let base_url = env::var("BASE_URL").ok();
        let register_url = env::var("REGISTER_URL").ok();
        let admin_telegram_id = env::var("ADMIN_TELEGRAM_ID")
            .ok()
            .and_then(|s| s.parse().ok());
        let history_dir =
            env::var("HISTORY_DIR").unwrap_or_else(|_| "chat_history".to_string());
        let users_dir = env::var("USERS_DIR").unwrap_or_else(|_| "users".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/gbot.log".to_string());

        Ok(Self {
            bot_token,
            openai_api_key,
            model_name,
            base_url,
            register_url,
            admin_telegram_id,
            history_dir,
            users_dir,
            log_file,
        })
    }

    /// Validate config (URLs must parse when set).
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("BASE_URL", &self.base_url), ("REGISTER_URL", &self.register_url)] {
            if let Some(url_str) = url {
                if reqwest::Url::parse(url_str).is_err() {
                    anyhow::bail!("{} is set but not a valid URL: {}", name, url_str);
                }
            }
        }
        Ok(())
    }
}
