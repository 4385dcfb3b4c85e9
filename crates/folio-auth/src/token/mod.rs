//! Signed token issuance, verification, and unverified expiry inspection.

pub mod claims;
pub mod codec;

pub use claims::{Claims, TokenSubject};
pub use codec::{IssuedToken, TokenCodec, TokenError, peek_expiry};
