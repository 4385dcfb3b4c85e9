//! # folio-client
//!
//! Client-side session manager for the Folio admin API.
//!
//! Holds the admin token in a [`CredentialStore`], attaches it to outgoing
//! requests, and on a `401` runs at most one refresh at a time: every
//! request that fails while a refresh is in flight waits for it and is
//! replayed once with the new token. When the refresh fails the stored
//! credential is cleared and [`AuthEvent::ReauthenticationRequired`] is
//! broadcast.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{AuthEvent, SessionClient, SessionContext};
pub use config::{ClientConfig, Timeouts};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredential};
pub use error::ClientError;
pub use session::AdminSession;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, RequestKind, Transport};
