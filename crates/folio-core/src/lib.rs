//! # folio-core
//!
//! Core crate for the Folio admin service. Contains the configuration
//! schemas, the authentication error taxonomy with its stable wire codes,
//! and the shared result alias.
//!
//! This crate has **no** internal dependencies on other Folio crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
