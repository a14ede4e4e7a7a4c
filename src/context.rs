//! High-level client facade
//!
//! `SessionContext` bundles the session manager and the message gateway and
//! keeps a cached list of the signed-in account's messages, refreshed after
//! every sign-in and submission and cleared on sign-out. This is the surface
//! an application front end drives.

use crate::error::Result;
use crate::types::{Account, StoredMessage};
use crate::provider::{DocumentStore, IdentityProvider};
use crate::gateway::MessageGateway;
use crate::session::SessionManager;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Client facade over a session and its messages
pub struct SessionContext {
    session: SessionManager,
    gateway: MessageGateway,
    messages: RwLock<Vec<StoredMessage>>,
}

impl SessionContext {
    /// Build a context over the given providers
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        let session = SessionManager::new(identity, Arc::clone(&store));
        let gateway = MessageGateway::new(store, session.watch());
        Self {
            session,
            gateway,
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Start the session manager's event pump
    pub async fn start(&self) -> Result<()> {
        self.session.start().await
    }

    /// Stop background tasks
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }

    /// Register a new account, sign it in, and load its messages
    pub async fn register(&self, email: &str, password: &str) -> Result<Account> {
        let account = self.session.register(email, password).await?;
        self.refresh_messages().await?;
        Ok(account)
    }

    /// Sign in and load the account's messages
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Account> {
        let account = self.session.sign_in(email, password).await?;
        self.refresh_messages().await?;
        Ok(account)
    }

    /// Sign out and clear the cached message list
    pub async fn sign_out(&self) -> Result<()> {
        self.session.sign_out().await?;
        self.messages.write().await.clear();
        Ok(())
    }

    /// Submit a message and refresh the cached list
    pub async fn submit_message(&self, text: &str) -> Result<StoredMessage> {
        let stored = self.gateway.submit(text).await?;
        self.refresh_messages().await?;
        Ok(stored)
    }

    /// Replace the cached list with the store's current view
    pub async fn refresh_messages(&self) -> Result<()> {
        let listed = self.gateway.list_by_owner().await?;
        *self.messages.write().await = listed;
        Ok(())
    }

    /// The cached message list
    pub async fn messages(&self) -> Vec<StoredMessage> {
        self.messages.read().await.clone()
    }

    /// The signed-in account, if any
    pub fn current(&self) -> Option<Account> {
        self.session.current()
    }

    /// Watch the auth state
    pub fn watch(&self) -> tokio::sync::watch::Receiver<Option<Account>> {
        self.session.watch()
    }
}
