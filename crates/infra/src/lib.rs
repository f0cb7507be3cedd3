//! Infrastructure layer: configuration, persistence, external services and
//! the application services that tie them to the domain crates.

pub mod bank;
pub mod config;
pub mod error;
pub mod services;
pub mod store;
