pub mod cleanup;
pub mod commands;
pub mod queries;

// Re-exports
pub use cleanup::*;
pub use commands::*;
pub use queries::*;
