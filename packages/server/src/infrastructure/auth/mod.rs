//! Token verification

pub mod jwt;

pub use jwt::{JwtTokenVerifier, TokenClaims};
