//! Session lifecycle: the in-memory registry, login/refresh/logout flows,
//! and the background sweeper.

pub mod manager;
pub mod model;
pub mod store;
pub mod sweeper;

pub use manager::{LoginOutcome, SessionManager};
pub use model::{Session, SessionId};
pub use store::SessionStore;
pub use sweeper::{SweepReport, Sweeper};
