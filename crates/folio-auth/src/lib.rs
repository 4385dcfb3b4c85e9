//! # folio-auth
//!
//! Admin authentication for the Folio portfolio service.
//!
//! ## Modules
//!
//! - `token`: signed token issuance and verification
//! - `session`: in-memory session registry, login/refresh/logout flows, and the sweeper
//! - `blacklist`: revoked tokens awaiting natural expiry
//! - `gate`: per-request validation pipeline
//! - `credentials`: the single admin account and timing-safe credential checks
//! - `attempts`: failed login tracking per client

pub mod attempts;
pub mod blacklist;
pub mod credentials;
pub mod gate;
pub mod identity;
pub mod session;
pub mod token;

pub use attempts::LoginAttemptTracker;
pub use blacklist::TokenBlacklist;
pub use credentials::AdminAccount;
pub use gate::{AuthGate, Authenticated};
pub use identity::{Identity, Permission, PermissionSet, Role};
pub use session::{LoginOutcome, Session, SessionId, SessionManager, SessionStore, SweepReport, Sweeper};
pub use token::{Claims, IssuedToken, TokenCodec, TokenError, TokenSubject};
