//! Key codec for the forum keyspace
//!
//! Every record lives in one flat, ordered keyspace under a composite string
//! key of the form `<prefix>-<field>-<field>...`. Iteration order over a prefix
//! is plain byte order of these strings.
//!
//! ## Layout
//!
//! | Record            | Key                                         |
//! |-------------------|---------------------------------------------|
//! | Post              | `post-<time>-<username>`                    |
//! | Message           | `message-<to>-<time>-<from>`                |
//! | User              | `user-<username>`                           |
//! | UserPost index    | `userpost-<username>-<time>`                |
//! | Word index        | `word-<word>-<time>-<username>`             |
//! | Hashtag / mention | `<#tag or @mention>-<time>-<username>`      |
//!
//! ## Contract
//!
//! - Fields must not contain [`SEPARATOR`]. Encoding does not check this:
//!   factories call [`validate_field`] before saving, read paths check
//!   [`is_valid_field`] and miss, and index tokens cannot contain it by
//!   construction.
//! - Decoding never fails. Missing or non-numeric parts decode to `""` / `0`.
//! - Times are rendered as unpadded decimal integers, so byte order only
//!   matches numeric order while all times have the same digit count.

use thiserror::Error;

use crate::error::Error;

/// Separator between key components
pub const SEPARATOR: char = '-';

/// Key of the registration flag record
pub const REGISTRATION_KEY: &str = "registration";

/// Key validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Field is empty
    #[error("key field must not be empty")]
    Empty,

    /// Field contains the separator character
    #[error("key field '{0}' must not contain '{SEPARATOR}'")]
    ContainsSeparator(String),
}

impl From<KeyError> for Error {
    fn from(e: KeyError) -> Self {
        Error::InvalidInput(e.to_string())
    }
}

/// Validate a single user-supplied key field (usernames).
pub fn validate_field(field: &str) -> Result<(), KeyError> {
    if field.is_empty() {
        return Err(KeyError::Empty);
    }
    if field.contains(SEPARATOR) {
        return Err(KeyError::ContainsSeparator(field.to_string()));
    }
    Ok(())
}

/// True if `field` can be used as a key field
pub fn is_valid_field(field: &str) -> bool {
    validate_field(field).is_ok()
}

/// Record families with a fixed textual prefix.
///
/// Hashtag and mention keys use the token itself as the head and are built
/// with [`tag_key`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// `post-<time>-<username>`
    Post,
    /// `message-<to>-<time>-<from>`
    Message,
    /// `user-<username>`
    User,
    /// `userpost-<username>-<time>`
    UserPost,
    /// `word-<word>-<time>-<username>`
    Word,
}

impl KeyKind {
    /// Head component of keys of this kind
    pub const fn head(self) -> &'static str {
        match self {
            KeyKind::Post => "post",
            KeyKind::Message => "message",
            KeyKind::User => "user",
            KeyKind::UserPost => "userpost",
            KeyKind::Word => "word",
        }
    }

    /// Scan prefix covering every key of this kind (`<head>-`)
    pub fn prefix(self) -> String {
        let mut prefix = String::with_capacity(self.head().len() + 1);
        prefix.push_str(self.head());
        prefix.push(SEPARATOR);
        prefix
    }

    /// Encode a key of this kind from its fields
    pub fn encode(self, fields: &[&str]) -> String {
        encode(self.head(), fields)
    }
}

/// Join a head and its fields with [`SEPARATOR`].
pub fn encode(head: &str, fields: &[&str]) -> String {
    let len = head.len() + fields.iter().map(|f| f.len() + 1).sum::<usize>();
    let mut key = String::with_capacity(len);
    key.push_str(head);
    for field in fields {
        key.push(SEPARATOR);
        key.push_str(field);
    }
    key
}

/// Split a key into its components, head included.
pub fn decode(key: &str) -> DecodedKey<'_> {
    DecodedKey {
        parts: key.split(SEPARATOR).collect(),
    }
}

/// Components of a decoded key with lenient accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey<'a> {
    parts: Vec<&'a str>,
}

impl<'a> DecodedKey<'a> {
    /// All components, head first
    pub fn parts(&self) -> &[&'a str] {
        &self.parts
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True if the key had no components (never true for `split`, kept for clippy)
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Component at `index`, or `""` when the key is too short
    pub fn text(&self, index: usize) -> &'a str {
        self.parts.get(index).copied().unwrap_or("")
    }

    /// Component at `index` parsed as an integer, or `0`
    pub fn int(&self, index: usize) -> i64 {
        self.parts
            .get(index)
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(0)
    }
}

// ============================================================================
// Posts
// ============================================================================

/// `post-<time>-<username>`
pub fn post_key(time: i64, username: &str) -> String {
    KeyKind::Post.encode(&[&time.to_string(), username])
}

/// Seek position for post scans resuming at `time` (`post-<time>`)
pub fn post_seek(time: i64) -> String {
    KeyKind::Post.encode(&[&time.to_string()])
}

/// Time component of a post key, `0` when malformed
pub fn time_from_post_key(key: &str) -> i64 {
    decode(key).int(1)
}

/// Username component of a post key, `""` when malformed
pub fn username_from_post_key(key: &str) -> String {
    decode(key).text(2).to_string()
}

// ============================================================================
// Messages
// ============================================================================

/// `message-<to>-<time>-<from>`
pub fn message_key(to_username: &str, time: i64, from_username: &str) -> String {
    KeyKind::Message.encode(&[to_username, &time.to_string(), from_username])
}

/// Prefix of every message addressed to `to_username`
pub fn message_prefix(to_username: &str) -> String {
    let mut prefix = KeyKind::Message.encode(&[to_username]);
    prefix.push(SEPARATOR);
    prefix
}

/// Recipient component of a message key
pub fn to_username_from_message_key(key: &str) -> String {
    decode(key).text(1).to_string()
}

/// Sent-time component of a message key
pub fn time_from_message_key(key: &str) -> i64 {
    decode(key).int(2)
}

/// Sender component of a message key
pub fn from_username_from_message_key(key: &str) -> String {
    decode(key).text(3).to_string()
}

// ============================================================================
// Users
// ============================================================================

/// `user-<username>`
pub fn user_key(username: &str) -> String {
    KeyKind::User.encode(&[username])
}

/// Prefix of every user whose name starts with `username_prefix`
///
/// An empty `username_prefix` yields `user-`, covering all users.
pub fn user_prefix(username_prefix: &str) -> String {
    let mut prefix = KeyKind::User.prefix();
    prefix.push_str(username_prefix);
    prefix
}

// ============================================================================
// Index records
// ============================================================================

/// `userpost-<username>-<time>`
pub fn user_post_key(username: &str, time: i64) -> String {
    KeyKind::UserPost.encode(&[username, &time.to_string()])
}

/// `userpost-<username>-`
pub fn user_post_prefix(username: &str) -> String {
    let mut prefix = KeyKind::UserPost.encode(&[username]);
    prefix.push(SEPARATOR);
    prefix
}

/// `word-<word>-<time>-<username>`
pub fn word_key(word: &str, time: i64, username: &str) -> String {
    KeyKind::Word.encode(&[word, &time.to_string(), username])
}

/// `word-<word>`, deliberately without a trailing separator so that a scan
/// also matches longer words starting with `word`.
pub fn word_prefix(word: &str) -> String {
    KeyKind::Word.encode(&[word])
}

/// Time component of a word index key, `0` when malformed
pub fn time_from_word_key(key: &str) -> i64 {
    decode(key).int(2)
}

/// `<token>-<time>-<username>` for a hashtag (`#tag`) or mention (`@name`)
pub fn tag_key(token: &str, time: i64, username: &str) -> String {
    encode(token, &[&time.to_string(), username])
}

/// `<token>-`
pub fn tag_prefix(token: &str) -> String {
    let mut prefix = String::with_capacity(token.len() + 1);
    prefix.push_str(token);
    prefix.push(SEPARATOR);
    prefix
}

/// Seek position for tag scans resuming at `time` (`<token>-<time>`)
pub fn tag_seek(token: &str, time: i64) -> String {
    encode(token, &[&time.to_string()])
}

/// Time component of a hashtag/mention key, `0` when malformed
pub fn time_from_tag_key(key: &str) -> i64 {
    decode(key).int(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_does_not_check_fields() {
        assert_eq!(user_key("al-ice"), "user-al-ice");
        assert!(!is_valid_field("al-ice"));
        assert!(!is_valid_field(""));
        assert!(is_valid_field("alice"));
    }

    #[test]
    fn test_post_key_layout() {
        assert_eq!(post_key(1650000000, "alice"), "post-1650000000-alice");
        assert_eq!(post_seek(1650000000), "post-1650000000");
    }

    #[test]
    fn test_post_key_accessors() {
        let key = post_key(42, "bob");
        assert_eq!(time_from_post_key(&key), 42);
        assert_eq!(username_from_post_key(&key), "bob");
    }

    #[test]
    fn test_malformed_keys_decode_to_defaults() {
        assert_eq!(time_from_post_key("post"), 0);
        assert_eq!(username_from_post_key("post-12"), "");
        assert_eq!(time_from_post_key("post-abc-bob"), 0);
        assert_eq!(time_from_word_key("word-hello"), 0);
        assert_eq!(time_from_message_key(""), 0);
        assert_eq!(from_username_from_message_key("message-bob"), "");
    }

    #[test]
    fn test_message_key_accessors() {
        let key = message_key("bob", 100, "alice");
        assert_eq!(key, "message-bob-100-alice");
        assert_eq!(to_username_from_message_key(&key), "bob");
        assert_eq!(time_from_message_key(&key), 100);
        assert_eq!(from_username_from_message_key(&key), "alice");
        assert!(key.starts_with(&message_prefix("bob")));
        assert!(!key.starts_with(&message_prefix("bo")));
    }

    #[test]
    fn test_index_keys() {
        assert_eq!(user_post_key("alice", 7), "userpost-alice-7");
        assert_eq!(user_post_prefix("alice"), "userpost-alice-");
        assert_eq!(word_key("hello", 7, "alice"), "word-hello-7-alice");
        assert_eq!(word_prefix("hel"), "word-hel");
        assert_eq!(tag_key("#rust", 7, "alice"), "#rust-7-alice");
        assert_eq!(tag_prefix("@bob"), "@bob-");
        assert_eq!(tag_seek("#rust", 7), "#rust-7");
        assert_eq!(time_from_tag_key("#rust-7-alice"), 7);
        assert_eq!(time_from_word_key("word-hello-7-alice"), 7);
    }

    #[test]
    fn test_user_prefix_does_not_cover_user_posts() {
        let all_users = user_prefix("");
        assert_eq!(all_users, "user-");
        assert!(!user_post_key("alice", 1).starts_with(&all_users));
        assert!(user_key("alice").starts_with(&user_prefix("al")));
    }

    #[test]
    fn test_validate_field() {
        assert!(validate_field("alice").is_ok());
        assert_eq!(validate_field(""), Err(KeyError::Empty));
        assert!(matches!(
            validate_field("al-ice"),
            Err(KeyError::ContainsSeparator(_))
        ));
    }

    #[test]
    fn test_same_width_times_sort_numerically() {
        let older = post_key(1650000000, "zed");
        let newer = post_key(1650000001, "amy");
        assert!(older < newer);
    }

    #[test]
    fn test_cross_width_times_do_not_sort_numerically() {
        // Unpadded decimal times: 999 sorts after 1000 as a string.
        let small = post_key(999, "a");
        let large = post_key(1000, "a");
        assert!(small > large);
    }

    proptest! {
        #[test]
        fn prop_encode_decode_round_trip(
            head in "[a-z#@]{1,8}",
            fields in prop::collection::vec("[a-zA-Z0-9_]{0,12}", 0..5),
        ) {
            let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
            let key = encode(&head, &refs);
            let decoded = decode(&key);
            prop_assert_eq!(decoded.text(0), head.as_str());
            prop_assert_eq!(&decoded.parts()[1..], refs.as_slice());
        }

        #[test]
        fn prop_post_key_round_trip(time in 0i64..i64::MAX, username in "[a-zA-Z0-9_]{1,16}") {
            let key = post_key(time, &username);
            prop_assert_eq!(time_from_post_key(&key), time);
            prop_assert_eq!(username_from_post_key(&key), username);
        }

        #[test]
        fn prop_same_width_times_preserve_order(a in 1_000_000_000i64..9_999_999_999, b in 1_000_000_000i64..9_999_999_999) {
            let ka = post_key(a, "u");
            let kb = post_key(b, "u");
            prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
        }
    }
}
