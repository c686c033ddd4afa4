//! One-time user registration: a per-user JSON record plus a best-effort
//! notification to an external service. Never blocks or fails the message flow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gbot_core::{Message, Middleware, Result, User};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const REGISTER_TIMEOUT: Duration = Duration::from_secs(10);

/// What is persisted to `{users_dir}/{id}.json` on first contact.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub telegram_id: i64,
    pub first: String,
    pub last: String,
    pub username: String,
    pub date_registered: DateTime<Utc>,
}

impl UserRecord {
    fn of(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            telegram_id: user.id,
            first: user.first_name.clone().unwrap_or_default(),
            last: user.last_name.clone().unwrap_or_default(),
            username: user.username.clone().unwrap_or_default(),
            date_registered: now,
        }
    }
}

/// Registers a user the first time a message from them is seen: writes the
/// user record and fires the registration POST as a detached task whose
/// result is observed only in logs. Presence of the record file is the sole
/// registration gate; an in-memory cache skips the file check after first contact.
pub struct RegistrationMiddleware {
    users_dir: PathBuf,
    register_url: Option<String>,
    http: reqwest::Client,
    seen: Arc<Mutex<HashSet<i64>>>,
}

impl RegistrationMiddleware {
    pub fn new(users_dir: impl Into<PathBuf>, register_url: Option<String>) -> Self {
        Self {
            users_dir: users_dir.into(),
            register_url,
            http: reqwest::Client::new(),
            seen: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn notify_external(&self, record: &UserRecord) {
        let Some(url) = self.register_url.clone() else {
            debug!(user_id = record.telegram_id, "No register URL configured, skipping notification");
            return;
        };

        let body = serde_json::json!({
            "telegram_id": record.telegram_id,
            "first": record.first,
            "last": record.last,
        });
        let http = self.http.clone();
        let user_id = record.telegram_id;

        // Fire-and-forget: the task owns the request; its outcome is logged,
        // never retried, never surfaced to the user.
        tokio::spawn(async move {
            match http
                .post(&url)
                .json(&body)
                .timeout(REGISTER_TIMEOUT)
                .send()
                .await
            {
                Ok(response) => {
                    info!(user_id = user_id, status = %response.status(), "Registration notification sent");
                }
                Err(e) => {
                    warn!(user_id = user_id, error = %e, "Failed to notify registration service");
                }
            }
        });
    }
}

#[async_trait]
impl Middleware for RegistrationMiddleware {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn before(&self, message: &Message) -> Result<bool> {
        let user_id = message.user.id;

        {
            let seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            if seen.contains(&user_id) {
                return Ok(true);
            }
        }

        let user_file = self.users_dir.join(format!("{}.json", user_id));
        if !user_file.exists() {
            std::fs::create_dir_all(&self.users_dir)?;
            let record = UserRecord::of(&message.user, Utc::now());
            std::fs::write(&user_file, serde_json::to_string_pretty(&record).map_err(
                |e| gbot_core::GbotError::Config(format!("serialize user record: {}", e)),
            )?)?;
            info!(user_id = user_id, path = %user_file.display(), "Registered new user");

            self.notify_external(&record);
        }

        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id);

        Ok(true)
    }
}
