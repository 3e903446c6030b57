//! lopper application library
//!
//! This exposes the public API of the lopper application for testing and external usage.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod services;
pub mod tui;
