/// API routes and handlers, one module per service
pub mod auth;
pub mod collection;
pub mod extract;
pub mod health;
pub mod media;
