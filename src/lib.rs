//! Bookshelf application library
//!
//! Book catalogue modules plus the bootstrap used by the server and CLI binaries.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::{migrate, route_registry, serve};
