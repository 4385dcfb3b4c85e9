//! # folio-api
//!
//! HTTP API layer for the Folio admin service built on Axum.
//!
//! Provides the `/admin` endpoints, the health check, middleware (rate
//! limiting, security headers, request ids, CORS, logging), extractors,
//! DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
