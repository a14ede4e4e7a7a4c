//! # sendit-client
//!
//! Client library for a minimal hosted messaging service: authenticate with
//! an email/password identity provider, submit short text messages to a
//! document store, and list the messages the signed-in account owns.
//!
//! The backend is abstracted behind two provider traits, so the hosted
//! Firebase backend and the in-memory test backend are interchangeable:
//!
//! - [`IdentityProvider`] — account registration, sign-in/out, auth events
//! - [`DocumentStore`] — keyed document writes and equality queries
//!
//! ## Quick Start
//!
//! ```
//! use sendit_client::{MemoryIdentity, MemoryStore, SessionContext};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> sendit_client::Result<()> {
//!     let ctx = SessionContext::new(
//!         Arc::new(MemoryIdentity::new()),
//!         Arc::new(MemoryStore::new()),
//!     );
//!
//!     ctx.register("user@example.com", "secret1").await?;
//!     ctx.submit_message("hello from sendit").await?;
//!
//!     for stored in ctx.messages().await {
//!         println!("{}: {}", stored.key, stored.message.text);
//!     }
//!
//!     ctx.sign_out().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Hosted backend
//!
//! ```no_run
//! use sendit_client::{FirebaseAuth, FirebaseConfig, SessionContext};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> sendit_client::Result<()> {
//!     let auth = Arc::new(FirebaseAuth::new(FirebaseConfig::from_env()?)?);
//!     let store = Arc::new(auth.store());
//!     let ctx = SessionContext::new(auth, store);
//!
//!     ctx.sign_in("user@example.com", "secret1").await?;
//!     ctx.submit_message("hello").await?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;
pub mod gateway;
pub mod provider;
pub mod session;
pub mod types;
pub mod validate;

pub use context::SessionContext;
pub use error::{ClientError, Result};
pub use gateway::MessageGateway;
pub use provider::firebase::{FirebaseAuth, FirebaseClient, FirebaseConfig, FirestoreStore};
pub use provider::memory::{MemoryIdentity, MemoryStore};
pub use provider::{AuthSubscription, DocumentStore, IdentityProvider};
pub use session::SessionManager;
pub use types::{Account, AuthEvent, Document, Message, StoredMessage};
pub use validate::{is_email_valid, MIN_PASSWORD_LEN};
