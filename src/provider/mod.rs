//! Provider traits — the core abstractions for external backends
//!
//! The client delegates credential verification to an `IdentityProvider` and
//! persistence to a `DocumentStore`. All backends (hosted Firebase,
//! in-memory, etc.) implement these traits to provide a uniform API.

use crate::error::Result;
use crate::types::{Account, AuthEvent, Document};
use async_trait::async_trait;

pub mod firebase;
pub mod memory;

/// Size of the auth-event broadcast channel used by the built-in providers
pub(crate) const AUTH_EVENT_BUFFER_SIZE: usize = 64;

/// External hosted service performing credential verification and issuing
/// account identities
///
/// Implementations handle the transport-specific details. Token and session
/// internals stay opaque to the client; only the resulting `Account` (or
/// absence thereof) is observable.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account with the provider
    ///
    /// The provider enforces its own password policy; violations surface as
    /// `WeakPassword`. Other rejections carry the provider's message.
    async fn create_account(&self, email: &str, password: &str) -> Result<Account>;

    /// Verify credentials and establish a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account>;

    /// End the current session
    async fn sign_out(&self) -> Result<()>;

    /// Subscribe to auth-state transitions
    ///
    /// The returned subscription yields one `AuthEvent` per sign-in or
    /// sign-out until dropped.
    async fn subscribe(&self) -> Result<Box<dyn AuthSubscription>>;

    /// Provider name (e.g., "firebase", "memory")
    fn name(&self) -> &str;
}

/// Async stream of auth-state transitions from an identity provider
#[async_trait]
pub trait AuthSubscription: Send + Sync {
    /// Receive the next transition; `None` means the stream is closed
    async fn next(&mut self) -> Result<Option<AuthEvent>>;
}

/// External hosted service providing keyed writes and filtered queries over
/// flat records
///
/// No transactions and no multi-document atomicity — each call is a single
/// round trip.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a record under `key` in `collection`, overwriting any existing
    /// document
    ///
    /// The store assigns the creation time; the returned `Document` carries
    /// it when the backend reports one.
    async fn put(&self, collection: &str, key: &str, fields: &serde_json::Value)
        -> Result<Document>;

    /// Fetch all records in `collection` whose `field` equals `value`
    ///
    /// Results come back in provider-default order, annotated with their
    /// storage keys. No pagination.
    async fn query_eq(&self, collection: &str, field: &str, value: &str)
        -> Result<Vec<Document>>;

    /// Store name (e.g., "firestore", "memory")
    fn name(&self) -> &str;
}
