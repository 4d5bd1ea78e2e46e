//! Core types and trait definitions for the DeceptiScan backend services.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend (`deceptiscan-store-sqlite`), the identity backends
//! (`deceptiscan-identity`) and the HTTP layer (`deceptiscan-api`) all meet
//! at the traits defined here.

pub mod article;
pub mod clock;
pub mod document;
pub mod error;
pub mod history;
pub mod identity;
pub mod store;

pub use error::{Error, Result};
