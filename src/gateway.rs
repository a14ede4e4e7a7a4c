//! Message submission and retrieval
//!
//! `MessageGateway` writes messages to the document store on behalf of the
//! signed-in account and lists the messages that account owns. It observes
//! the session through a watch receiver, so both operations are gated on a
//! live sign-in without holding a reference to the session manager itself.

use crate::error::{ClientError, Result};
use crate::types::{message_key, Account, Message, StoredMessage, MESSAGES_COLLECTION};
use crate::provider::DocumentStore;
use crate::validate::validate_message_text;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

/// Submits and lists messages for the signed-in account
pub struct MessageGateway {
    store: Arc<dyn DocumentStore>,
    auth: watch::Receiver<Option<Account>>,
}

impl MessageGateway {
    /// Create a gateway over `store`, gated on the given auth state
    pub fn new(store: Arc<dyn DocumentStore>, auth: watch::Receiver<Option<Account>>) -> Self {
        Self { store, auth }
    }

    fn current_account(&self) -> Result<Account> {
        self.auth
            .borrow()
            .clone()
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Submit a message owned by the signed-in account
    ///
    /// The text must be non-empty after trimming; a blank body is reported
    /// before the session is checked. The stored record carries the text
    /// and the owner's uid under a key derived from the owner's email and
    /// the submission time.
    pub async fn submit(&self, text: &str) -> Result<StoredMessage> {
        validate_message_text(text)?;
        let account = self.current_account()?;

        let key = message_key(&account.email);
        let document = self
            .store
            .put(
                MESSAGES_COLLECTION,
                &key,
                &json!({ "text": text, "uid": account.uid }),
            )
            .await?;

        tracing::info!(key = %document.key, uid = %account.uid, "Message submitted");
        Ok(StoredMessage {
            key: document.key,
            message: Message {
                uid: account.uid,
                text: text.to_string(),
                created_at: document.create_time,
            },
        })
    }

    /// List the messages owned by the signed-in account
    ///
    /// Retrieval failures are logged and yield an empty list; only a
    /// missing session is surfaced as an error.
    pub async fn list_by_owner(&self) -> Result<Vec<StoredMessage>> {
        let account = self.current_account()?;

        let documents = match self
            .store
            .query_eq(MESSAGES_COLLECTION, "uid", &account.uid)
            .await
        {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(uid = %account.uid, error = %e, "Message query failed");
                return Ok(Vec::new());
            }
        };

        let messages = documents
            .into_iter()
            .filter_map(|doc| {
                let text = match doc.fields.get("text").and_then(|v| v.as_str()) {
                    Some(text) => text.to_string(),
                    None => {
                        tracing::warn!(key = %doc.key, "Skipping message without text");
                        return None;
                    }
                };
                Some(StoredMessage {
                    key: doc.key,
                    message: Message {
                        uid: account.uid.clone(),
                        text,
                        created_at: doc.create_time,
                    },
                })
            })
            .collect();

        Ok(messages)
    }
}
