//! Photo relay: download the photo from Telegram, pass it through to the
//! backend upload endpoint, then run the dispatch pipeline with the stored
//! image's URL. Pure I/O pass-through; any failure is reported and no
//! dispatch happens.

use async_trait::async_trait;
use gbot_core::{ChatApi, GbotError, Handler, HandlerResponse, Message, Result};
use pipeline::GptHandler;
use std::sync::Arc;
use teloxide::net::Download;
use teloxide::prelude::*;
use tracing::{error, info, instrument, warn};

pub const UPLOAD_FAILURE_REPLY: &str = "❌ Failed to upload the photo.";

/// Uploads photo bytes to `{base_url}/users/{id}/upload-photo/` and returns
/// the stored image's absolute URL.
pub struct PhotoUploader {
    http: reqwest::Client,
    base_url: String,
}

impl PhotoUploader {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Downloads the Telegram file and relays it to the upload endpoint.
    /// Expects HTTP 201 with a `download_url` field in the JSON body.
    #[instrument(skip(self, bot, file_id))]
    pub async fn relay(&self, bot: &Bot, user_id: i64, file_id: &str) -> Result<String> {
        let file = bot
            .get_file(file_id)
            .await
            .map_err(|e| GbotError::Upload(format!("get_file: {}", e)))?;

        let temp_path = std::env::temp_dir().join(format!("{}_photo.jpg", user_id));
        let mut dst = tokio::fs::File::create(&temp_path).await?;
        bot.download_file(&file.path, &mut dst)
            .await
            .map_err(|e| GbotError::Upload(format!("download: {}", e)))?;
        let bytes = tokio::fs::read(&temp_path).await?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("photo.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| GbotError::Upload(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let upload_url = format!("{}/users/{}/upload-photo/", self.base_url, user_id);
        let response = self
            .http
            .post(&upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GbotError::Upload(e.to_string()))?;

        if response.status() != reqwest::StatusCode::CREATED {
            return Err(GbotError::Upload(format!(
                "upload endpoint returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GbotError::Upload(e.to_string()))?;
        let download_url = body
            .get("download_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GbotError::Upload("no download_url in response".to_string()))?;

        info!(user_id = user_id, download_url = %download_url, "Photo relayed to backend");
        Ok(format!("{}{}", self.base_url, download_url))
    }
}

/// Chain handler for photo messages: relay the photo, then hand the image URL
/// to the dispatch pipeline.
pub struct PhotoHandler {
    bot: Bot,
    chat_api: Arc<dyn ChatApi>,
    uploader: Option<PhotoUploader>,
    gpt: Arc<GptHandler>,
}

impl PhotoHandler {
    pub fn new(
        bot: Bot,
        chat_api: Arc<dyn ChatApi>,
        uploader: Option<PhotoUploader>,
        gpt: Arc<GptHandler>,
    ) -> Self {
        Self {
            bot,
            chat_api,
            uploader,
            gpt,
        }
    }
}

#[async_trait]
impl Handler for PhotoHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.message_type != "photo" {
            return Ok(HandlerResponse::Ignore);
        }
        let Some(file_id) = message.photo_file_id.as_deref() else {
            return Ok(HandlerResponse::Ignore);
        };

        let Some(uploader) = &self.uploader else {
            warn!(user_id = message.user.id, "BASE_URL not configured, photo dropped");
            self.chat_api
                .send_message(&message.chat, UPLOAD_FAILURE_REPLY)
                .await?;
            return Ok(HandlerResponse::Stop);
        };

        match uploader.relay(&self.bot, message.user.id, file_id).await {
            Ok(image_url) => self.gpt.handle_image(message, &image_url).await,
            Err(e) => {
                error!(user_id = message.user.id, error = %e, "Photo relay failed");
                self.chat_api
                    .send_message(&message.chat, UPLOAD_FAILURE_REPLY)
                    .await?;
                Ok(HandlerResponse::Stop)
            }
        }
    }
}
