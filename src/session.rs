//! Session lifecycle: registration, sign-in, sign-out, auth-state observation
//!
//! `SessionManager` wraps an identity provider and keeps an observable view
//! of the signed-in account in a watch channel. Local calls update the view
//! synchronously; an optional pump task applies transitions reported by the
//! provider itself, so out-of-band sign-outs are also observed.

use crate::error::Result;
use crate::types::{Account, USERS_COLLECTION};
use crate::provider::{DocumentStore, IdentityProvider};
use crate::validate::{validate_email, validate_password};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Manages the authenticated session against an identity provider
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    state_tx: watch::Sender<Option<Account>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Create a session manager over the given providers
    ///
    /// The session starts signed out. Call [`SessionManager::start`] to also
    /// track transitions the provider reports on its own.
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        let (state_tx, _) = watch::channel(None);
        Self {
            identity,
            store,
            state_tx,
            pump: Mutex::new(None),
        }
    }

    /// Start the pump task that mirrors provider-reported auth events into
    /// the watch channel
    pub async fn start(&self) -> Result<()> {
        let mut pump = self.pump.lock().await;
        if pump.is_some() {
            return Ok(());
        }

        let mut subscription = self.identity.subscribe().await?;
        let state_tx = self.state_tx.clone();
        let provider = self.identity.name().to_string();

        let handle = tokio::spawn(async move {
            loop {
                match subscription.next().await {
                    Ok(Some(event)) => {
                        state_tx.send_replace(event.account().cloned());
                    }
                    Ok(None) => {
                        tracing::debug!(provider = %provider, "Auth event stream ended");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(provider = %provider, error = %e, "Auth event stream failed");
                        break;
                    }
                }
            }
        });

        *pump = Some(handle);
        tracing::debug!(provider = %self.identity.name(), "Session manager started");
        Ok(())
    }

    /// Stop the pump task, if running
    pub async fn shutdown(&self) {
        if let Some(handle) = self.pump.lock().await.take() {
            handle.abort();
        }
    }

    /// Register a new account and sign it in
    ///
    /// Validates the email shape and password length locally before calling
    /// the provider, then records the account in the `users` collection
    /// keyed by email. A failed record write leaves the session signed in
    /// and surfaces the error.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account> {
        validate_email(email)?;
        validate_password(password)?;

        let account = self.identity.create_account(email, password).await?;
        self.state_tx.send_replace(Some(account.clone()));

        if let Err(e) = self
            .store
            .put(
                USERS_COLLECTION,
                &account.email,
                &json!({ "uid": account.uid, "email": account.email }),
            )
            .await
        {
            tracing::warn!(email = %account.email, error = %e, "Account record write failed");
            return Err(e);
        }

        tracing::info!(email = %account.email, "Registered");
        Ok(account)
    }

    /// Sign in to an existing account
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Account> {
        validate_email(email)?;

        let account = self.identity.sign_in(email, password).await?;
        self.state_tx.send_replace(Some(account.clone()));

        tracing::info!(email = %account.email, "Session opened");
        Ok(account)
    }

    /// Sign out and clear the observable state
    pub async fn sign_out(&self) -> Result<()> {
        self.identity.sign_out().await?;
        self.state_tx.send_replace(None);
        tracing::info!("Session closed");
        Ok(())
    }

    /// The signed-in account, if any
    pub fn current(&self) -> Option<Account> {
        self.state_tx.borrow().clone()
    }

    /// Watch the auth state; receivers see every transition
    pub fn watch(&self) -> watch::Receiver<Option<Account>> {
        self.state_tx.subscribe()
    }
}
