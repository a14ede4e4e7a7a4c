//! In-memory providers for development and testing
//!
//! `MemoryIdentity` and `MemoryStore` implement the provider traits without
//! any network I/O. State lives in process memory and is lost on drop.

use crate::error::{ClientError, Result};
use crate::types::{Account, AuthEvent, Document};
use crate::validate::MIN_PASSWORD_LEN;
use crate::provider::{AuthSubscription, DocumentStore, IdentityProvider, AUTH_EVENT_BUFFER_SIZE};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

/// In-memory identity provider
///
/// Verifies credentials against a process-local account table and broadcasts
/// auth-state transitions to subscribers. Enforces the same minimum password
/// length the hosted provider does.
pub struct MemoryIdentity {
    /// email → (account, password)
    accounts: RwLock<HashMap<String, (Account, String)>>,

    /// The provider's own notion of the signed-in user
    current: RwLock<Option<Account>>,

    /// Broadcast channel for auth-state transitions
    events: broadcast::Sender<AuthEvent>,
}

impl MemoryIdentity {
    /// Create an empty in-memory identity provider
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_BUFFER_SIZE);
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            events,
        }
    }

    /// Number of registered accounts
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    fn emit(&self, event: AuthEvent) {
        // Send fails only when no subscriber exists, which is fine
        let _ = self.events.send(event);
    }
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<Account> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::WeakPassword {
                min_len: MIN_PASSWORD_LEN,
            });
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(ClientError::provider(
                "createAccount",
                format!("email already in use: {}", email),
            ));
        }

        let account = Account::new(email);
        accounts.insert(email.to_string(), (account.clone(), password.to_string()));
        drop(accounts);

        *self.current.write().await = Some(account.clone());
        self.emit(AuthEvent::SignedIn(account.clone()));

        tracing::debug!(email = %email, uid = %account.uid, "Account created");
        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account> {
        let accounts = self.accounts.read().await;
        let account = match accounts.get(email) {
            Some((account, stored)) if stored == password => account.clone(),
            _ => {
                return Err(ClientError::provider(
                    "signIn",
                    "invalid email or password",
                ))
            }
        };
        drop(accounts);

        *self.current.write().await = Some(account.clone());
        self.emit(AuthEvent::SignedIn(account.clone()));

        tracing::debug!(email = %email, "Signed in");
        Ok(account)
    }

    async fn sign_out(&self) -> Result<()> {
        *self.current.write().await = None;
        self.emit(AuthEvent::SignedOut);
        tracing::debug!("Signed out");
        Ok(())
    }

    async fn subscribe(&self) -> Result<Box<dyn AuthSubscription>> {
        Ok(Box::new(MemoryAuthSubscription {
            rx: self.events.subscribe(),
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Subscription over the in-memory provider's broadcast channel
pub struct MemoryAuthSubscription {
    rx: broadcast::Receiver<AuthEvent>,
}

#[async_trait]
impl AuthSubscription for MemoryAuthSubscription {
    async fn next(&mut self) -> Result<Option<AuthEvent>> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Ok(Some(event)),
                Err(broadcast::error::RecvError::Closed) => return Ok(None),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Only the latest state matters; drop the gap and continue
                    tracing::warn!(skipped, "Auth subscription lagged");
                }
            }
        }
    }
}

/// In-memory document store
///
/// Collections are kept in insertion order, matching the "provider default"
/// retrieval order contract. Overwriting a key preserves the original
/// creation time, as the hosted store does.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`
    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: &serde_json::Value,
    ) -> Result<Document> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let document = match docs.iter_mut().find(|d| d.key == key) {
            Some(existing) => {
                existing.fields = fields.clone();
                existing.clone()
            }
            None => {
                let document = Document {
                    key: key.to_string(),
                    fields: fields.clone(),
                    create_time: Some(Utc::now()),
                };
                docs.push(document.clone());
                document
            }
        };

        tracing::debug!(collection = %collection, key = %key, "Document written");
        Ok(document)
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let matches = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.fields.get(field).and_then(|v| v.as_str()) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(matches)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
