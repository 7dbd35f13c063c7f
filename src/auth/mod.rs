//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google OAuth2 authorization-code login flow
//! - Signed token issuance and validation
//! - User find-or-create on first login
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod routes;
pub mod service;
pub mod store;
pub mod token;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use provider::{GoogleProvider, IdentityProvider};
pub use routes::auth_routes;
pub use service::AuthService;
pub use store::{TokenStore, UserStore};
pub use token::TokenCodec;
