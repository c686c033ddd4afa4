//! Unit tests for RegistrationMiddleware: first-contact record creation,
//! idempotence, and never blocking the chain. No register URL is configured,
//! so no network is touched.

use crate::registration::{RegistrationMiddleware, UserRecord};
use chrono::Local;
use gbot_core::{Chat, Message, MessageDirection, Middleware, User};
use tempfile::TempDir;

fn create_test_message(user_id: i64) -> Message {
    Message {
        id: 1,
        user: User {
            id: user_id,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content: "salom".to_string(),
        message_type: "text".to_string(),
        photo_file_id: None,
        direction: MessageDirection::Incoming,
        created_at: Local::now(),
        reply_to_message_id: None,
    }
}

/// **Test: before() writes the user record on first contact and lets the chain continue.**
#[tokio::test]
async fn test_first_contact_writes_record() {
    let dir = TempDir::new().unwrap();
    let middleware = RegistrationMiddleware::new(dir.path(), None);

    let result = middleware.before(&create_test_message(123)).await;
    assert!(result.unwrap());

    let raw = std::fs::read_to_string(dir.path().join("123.json")).unwrap();
    let record: UserRecord = serde_json::from_str(&raw).unwrap();
    assert_eq!(record.telegram_id, 123);
    assert_eq!(record.first, "Test");
    assert_eq!(record.username, "test_user");
}

/// **Test: a second message does not rewrite the record.**
#[tokio::test]
async fn test_second_contact_keeps_record() {
    let dir = TempDir::new().unwrap();
    let middleware = RegistrationMiddleware::new(dir.path(), None);
    let message = create_test_message(123);

    middleware.before(&message).await.unwrap();
    let first_write = std::fs::read_to_string(dir.path().join("123.json")).unwrap();

    middleware.before(&message).await.unwrap();
    let second_read = std::fs::read_to_string(dir.path().join("123.json")).unwrap();
    assert_eq!(first_write, second_read);
}

/// **Test: an existing record from a previous run is honored (no rewrite, chain continues).**
#[tokio::test]
async fn test_existing_record_from_disk() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("123.json"), "{\"written\": \"earlier\"}").unwrap();
    let middleware = RegistrationMiddleware::new(dir.path(), None);

    let result = middleware.before(&create_test_message(123)).await;
    assert!(result.unwrap());

    let raw = std::fs::read_to_string(dir.path().join("123.json")).unwrap();
    assert_eq!(raw, "{\"written\": \"earlier\"}");
}

/// **Test: distinct users get distinct records.**
#[tokio::test]
async fn test_users_get_separate_records() {
    let dir = TempDir::new().unwrap();
    let middleware = RegistrationMiddleware::new(dir.path(), None);

    middleware.before(&create_test_message(1)).await.unwrap();
    middleware.before(&create_test_message(2)).await.unwrap();

    assert!(dir.path().join("1.json").exists());
    assert!(dir.path().join("2.json").exists());
}
