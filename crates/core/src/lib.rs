//! Lopper Core - Pure domain logic with no external dependencies
//!
//! This crate contains the cleanup rules, domain types, and ports (interfaces)
//! for lopper. It has no dependencies on UI frameworks, Git libraries, async
//! runtimes or filesystem operations - those are handled by adapters.

pub mod domain;
pub mod ports;
pub mod app;
pub mod error;

// Re-exports for ergonomics
pub use domain::*;
pub use error::*;
