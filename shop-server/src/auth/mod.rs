//! Authentication and authorization
//!
//! - [`JwtService`] - token issuing and validation
//! - [`CurrentUser`] - principal resolved from the bearer token
//! - [`policy`] - `authorize(principal, action, resource)`
//! - [`password`] - argon2 hashing

pub mod extractor;
pub mod jwt;
pub mod password;
pub mod policy;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use policy::{Action, Resource, authorize, require};
