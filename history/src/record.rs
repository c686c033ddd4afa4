//! One conversation turn as persisted in a monthly history file.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Role of a turn, one-to-one with the completion API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Turn content: plain text, or typed parts for multimodal turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One typed part of a multimodal turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    InputImage { image_url: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }

    pub fn image(image_url: impl Into<String>) -> Self {
        Content::Parts(vec![ContentPart::InputImage {
            image_url: image_url.into(),
        }])
    }

    /// Flattens the content to plain text; image parts contribute nothing.
    pub fn as_text(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::InputImage { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// One record of a monthly history log. Records are append-only and ordered by insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub role: Role,
    pub content: Content,
    /// Chat-surface message id; reply-threading looks prior turns up by this.
    pub message_id: Option<i64>,
    pub model_name: String,
    pub tokens: u32,
    /// Cost attributed to this record, serialized as a fixed 8-decimal string.
    #[serde(with = "price_serde")]
    pub price: f64,
    pub timestamp: DateTime<Local>,
}

impl HistoryRecord {
    pub fn new(
        role: Role,
        content: Content,
        message_id: Option<i64>,
        model_name: impl Into<String>,
        tokens: u32,
        price: f64,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            role,
            content,
            message_id,
            model_name: model_name.into(),
            tokens,
            price,
            timestamp,
        }
    }
}

/// Fixed-precision price serialization: written as an 8-decimal string,
/// read back from either a string or a bare number.
mod price_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.8}", price))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at_price(price: f64) -> HistoryRecord {
        HistoryRecord::new(
            Role::User,
            Content::text("salom"),
            Some(7),
            "o4-mini",
            12,
            price,
            Local.with_ymd_and_hms(2025, 8, 3, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_price_serializes_as_fixed_decimal_string() {
        let json = serde_json::to_value(record_at_price(0.0011)).unwrap();
        assert_eq!(json["price"], "0.00110000");
    }

    #[test]
    fn test_price_deserializes_from_string_or_number() {
        let from_str: HistoryRecord =
            serde_json::from_value(serde_json::to_value(record_at_price(0.0022)).unwrap())
                .unwrap();
        assert!((from_str.price - 0.0022).abs() < 1e-9);

        let mut json = serde_json::to_value(record_at_price(0.5)).unwrap();
        json["price"] = serde_json::json!(0.5);
        let from_num: HistoryRecord = serde_json::from_value(json).unwrap();
        assert!((from_num.price - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_content_untagged_round_trip() {
        let plain = Content::text("matn");
        let json = serde_json::to_string(&plain).unwrap();
        assert_eq!(json, "\"matn\"");

        let image = Content::image("https://example.uz/p.jpg");
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json[0]["type"], "input_image");
        assert_eq!(serde_json::from_value::<Content>(json).unwrap(), image);
    }

    #[test]
    fn test_as_text_flattens_parts() {
        let content = Content::Parts(vec![
            ContentPart::Text {
                text: "caption".to_string(),
            },
            ContentPart::InputImage {
                image_url: "https://example.uz/p.jpg".to_string(),
            },
        ]);
        assert_eq!(content.as_text(), "caption");
    }
}
