//! Hosted backend providers over the Firebase REST APIs
//!
//! `FirebaseAuth` implements the identity contract against Identity Toolkit
//! and `FirestoreStore` implements the document-store contract against
//! Firestore. Both share one HTTP client and one bearer-token cache, so
//! store calls are authenticated as whoever last signed in.
//!
//! The REST surface has no push stream for auth state, so auth events are
//! synthesized locally from the sign-in/sign-out calls made through this
//! provider, which is the same observable behavior a local auth listener
//! gives a single-process client.

pub mod client;
pub mod config;

use crate::error::{ClientError, Result};
use crate::types::{Account, AuthEvent};
use crate::provider::{AuthSubscription, DocumentStore, IdentityProvider, AUTH_EVENT_BUFFER_SIZE};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

pub use client::FirebaseClient;
pub use config::FirebaseConfig;

/// Token shared between the auth provider and the store
#[derive(Default)]
struct TokenCache {
    id_token: RwLock<Option<String>>,
}

impl TokenCache {
    async fn set(&self, token: Option<String>) {
        *self.id_token.write().await = token;
    }

    async fn get(&self) -> Result<String> {
        self.id_token
            .read()
            .await
            .clone()
            .ok_or(ClientError::NotAuthenticated)
    }
}

/// Identity provider backed by the Firebase Identity Toolkit API
pub struct FirebaseAuth {
    client: Arc<FirebaseClient>,
    tokens: Arc<TokenCache>,
    events: broadcast::Sender<AuthEvent>,
}

impl FirebaseAuth {
    /// Connect to the project described by `config`
    pub fn new(config: FirebaseConfig) -> Result<Self> {
        let client = Arc::new(FirebaseClient::new(config)?);
        let (events, _) = broadcast::channel(AUTH_EVENT_BUFFER_SIZE);
        Ok(Self {
            client,
            tokens: Arc::new(TokenCache::default()),
            events,
        })
    }

    /// A document store authenticated by this provider's session
    pub fn store(&self) -> FirestoreStore {
        FirestoreStore {
            client: Arc::clone(&self.client),
            tokens: Arc::clone(&self.tokens),
        }
    }

    async fn record_session(&self, response: client::AuthResponse) -> Account {
        let account = Account {
            uid: response.local_id,
            email: response.email,
            created_at: None,
        };
        self.tokens.set(Some(response.id_token)).await;
        let _ = self.events.send(AuthEvent::SignedIn(account.clone()));
        account
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<Account> {
        let response = self.client.sign_up(email, password).await?;
        let account = self.record_session(response).await;
        tracing::info!(email = %account.email, uid = %account.uid, "Account created");
        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account> {
        let response = self.client.sign_in_with_password(email, password).await?;
        let account = self.record_session(response).await;
        tracing::info!(email = %account.email, "Signed in");
        Ok(account)
    }

    async fn sign_out(&self) -> Result<()> {
        self.tokens.set(None).await;
        let _ = self.events.send(AuthEvent::SignedOut);
        tracing::info!("Signed out");
        Ok(())
    }

    async fn subscribe(&self) -> Result<Box<dyn AuthSubscription>> {
        Ok(Box::new(FirebaseAuthSubscription {
            rx: self.events.subscribe(),
        }))
    }

    fn name(&self) -> &str {
        "firebase"
    }
}

/// Subscription over locally synthesized Firebase auth events
pub struct FirebaseAuthSubscription {
    rx: broadcast::Receiver<AuthEvent>,
}

#[async_trait]
impl AuthSubscription for FirebaseAuthSubscription {
    async fn next(&mut self) -> Result<Option<AuthEvent>> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Ok(Some(event)),
                Err(broadcast::error::RecvError::Closed) => return Ok(None),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth subscription lagged");
                }
            }
        }
    }
}

/// Document store backed by the Firestore REST API
pub struct FirestoreStore {
    client: Arc<FirebaseClient>,
    tokens: Arc<TokenCache>,
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: &serde_json::Value,
    ) -> Result<crate::types::Document> {
        let token = self.tokens.get().await?;
        let document = self.client.patch_document(&token, collection, key, fields).await?;
        tracing::debug!(collection = %collection, key = %key, "Document written");
        Ok(document)
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<crate::types::Document>> {
        let token = self.tokens.get().await?;
        self.client.run_query(&token, collection, field, value).await
    }

    fn name(&self) -> &str {
        "firestore"
    }
}
