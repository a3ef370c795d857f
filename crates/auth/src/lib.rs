//! `voltran-auth`: bearer-token boundary of the ledger.
//!
//! Decodes and checks tokens; knows nothing about HTTP or storage. Token
//! issuance lives elsewhere.

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use roles::Role;
