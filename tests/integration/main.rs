//! Integration tests for the Folio admin server.

mod helpers;

mod auth_test;
mod client_test;
mod session_test;
