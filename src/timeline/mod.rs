//! # Timeline Module
//!
//! Timeline posts: the protected resource consumed through the
//! authenticated-user extractor.

pub mod handlers;
pub mod models;
pub mod routes;


pub use routes::timeline_routes;
