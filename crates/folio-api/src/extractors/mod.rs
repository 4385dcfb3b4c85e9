//! Custom Axum extractors.

pub mod auth;
pub mod client;

pub use auth::AdminUser;
pub use client::{ClientIp, RequestId, UserAgent};
