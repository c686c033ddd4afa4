//! Tests for [`openai_client::mask_token`], which keeps API keys out of logs.
//!
//! Long keys show only the first 7 and last 4 characters; anything of length
//! ≤ 11 is reduced to `***` so no segment of a short key ever leaks.

use openai_client::mask_token;

/// **Test: tokens of length ≤ 11 are fully masked.**
#[test]
fn mask_token_short_is_fully_masked() {
    assert_eq!(mask_token(""), "***");
    assert_eq!(mask_token("sk-1"), "***");
    assert_eq!(mask_token("sk-proj-123"), "***"); // exactly 11
}

/// **Test: the shortest unmasked length (12) shows head and tail with nothing hidden in between.**
#[test]
fn mask_token_twelve_chars_shows_head_and_tail() {
    assert_eq!(mask_token("sk-proj-wxyz"), "sk-proj***wxyz");
}

/// **Test: a realistic OpenAI project key masks to head(7) + *** + tail(4).**
#[test]
fn mask_token_long_key() {
    let key = "sk-proj-1234567890abcdefghijklmnopqrstuvwxyz";
    let masked = mask_token(key);
    assert_eq!(masked, "sk-proj***wxyz");
    assert_eq!(masked.len(), 7 + 3 + 4);
    assert!(!masked.contains("1234567890"));
}
