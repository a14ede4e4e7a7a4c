//! Core types for the sendit-client system
//!
//! All types use camelCase JSON serialization for wire compatibility with
//! the hosted document store's field names (`uid`, `text`, `createdAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// The authenticated identity record for one end user
///
/// Issued and owned by the external identity provider. Immutable from the
/// client's perspective once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque provider-assigned identifier
    pub uid: String,

    /// Email address, also used as a human-readable lookup key
    pub email: String,

    /// Server-assigned creation timestamp, when the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create an account record with a fresh provider-style uid
    ///
    /// Used by backends that assign identifiers locally (e.g. the in-memory
    /// provider). Hosted backends construct `Account` from their responses.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            uid: format!("uid-{}", uuid::Uuid::new_v4()),
            email: email.into(),
            created_at: Some(Utc::now()),
        }
    }
}

/// A single user-submitted text record associated with exactly one account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Owning account's uid (foreign key to `Account::uid`)
    pub uid: String,

    /// Message body, non-empty after trimming
    pub text: String,

    /// Store-assigned creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A message annotated with its storage identifier, as returned by queries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    /// Document key in the store
    pub key: String,

    /// The message record
    #[serde(flatten)]
    pub message: Message,
}

/// A flat record in the document store
#[derive(Debug, Clone)]
pub struct Document {
    /// Document key within its collection
    pub key: String,

    /// Record fields as arbitrary JSON
    pub fields: serde_json::Value,

    /// Store-assigned creation time, when the backend reports one
    pub create_time: Option<DateTime<Utc>>,
}

/// An auth-state transition reported by the identity provider
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// A user signed in (or an existing session was restored)
    SignedIn(Account),

    /// The current user signed out
    SignedOut,
}

impl AuthEvent {
    /// The account carried by this transition, if any
    pub fn account(&self) -> Option<&Account> {
        match self {
            AuthEvent::SignedIn(account) => Some(account),
            AuthEvent::SignedOut => None,
        }
    }
}

/// Collection holding mirrored account records, keyed by email
pub const USERS_COLLECTION: &str = "users";

/// Collection holding submitted messages
pub const MESSAGES_COLLECTION: &str = "messages";

/// Build a storage key for a message submitted by `owner_email`
///
/// Keys keep the `{email}_{epoch_millis}` shape, with the millis component
/// drawn from a monotonic source so rapid submissions by the same account
/// never collide.
pub fn message_key(owner_email: &str) -> String {
    format!("{}_{}", owner_email, next_key_millis())
}

/// Current time in Unix milliseconds
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Last millis value handed out for a storage key
static LAST_KEY_MILLIS: AtomicU64 = AtomicU64::new(0);

/// Wall-clock millis, bumped past the previous value on collision
fn next_key_millis() -> u64 {
    let now = now_millis();
    let mut last = LAST_KEY_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_KEY_MILLIS.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_account_new() {
        let account = Account::new("user@test.com");
        assert!(account.uid.starts_with("uid-"));
        assert_eq!(account.email, "user@test.com");
        assert!(account.created_at.is_some());
    }

    #[test]
    fn test_account_serialization_roundtrip() {
        let account = Account::new("user@test.com");
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"email\":\"user@test.com\""));
        assert!(json.contains("\"createdAt\""));

        let parsed: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, account);
    }

    #[test]
    fn test_account_deserializes_without_created_at() {
        let json = r#"{"uid":"uid-1","email":"a@b.co"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.uid, "uid-1");
        assert!(account.created_at.is_none());
    }

    #[test]
    fn test_message_camel_case_fields() {
        let message = Message {
            uid: "uid-1".to_string(),
            text: "hello".to_string(),
            created_at: Some(Utc::now()),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"uid\":\"uid-1\""));
        assert!(json.contains("\"text\":\"hello\""));
        assert!(json.contains("\"createdAt\""));
    }

    #[test]
    fn test_stored_message_flattens_record() {
        let stored = StoredMessage {
            key: "a@b.co_1700000000000".to_string(),
            message: Message {
                uid: "uid-1".to_string(),
                text: "hello".to_string(),
                created_at: None,
            },
        };
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"key\":\"a@b.co_1700000000000\""));
        assert!(json.contains("\"text\":\"hello\""));
        assert!(!json.contains("\"message\""));
    }

    #[test]
    fn test_message_key_shape() {
        let key = message_key("user@test.com");
        let (email, millis) = key.rsplit_once('_').unwrap();
        assert_eq!(email, "user@test.com");
        assert!(millis.parse::<u64>().unwrap() > 0);
    }

    #[test]
    fn test_message_keys_unique_under_rapid_submission() {
        let keys: HashSet<String> = (0..1000).map(|_| message_key("a@b.co")).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_message_key_millis_monotonic() {
        let a = message_key("a@b.co");
        let b = message_key("a@b.co");
        let millis = |k: &str| k.rsplit_once('_').unwrap().1.parse::<u64>().unwrap();
        assert!(millis(&b) > millis(&a));
    }

    #[test]
    fn test_auth_event_account() {
        let account = Account::new("a@b.co");
        assert_eq!(
            AuthEvent::SignedIn(account.clone()).account(),
            Some(&account)
        );
        assert_eq!(AuthEvent::SignedOut.account(), None);
    }
}
