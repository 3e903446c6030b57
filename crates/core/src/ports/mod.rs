pub mod git;
pub mod discovery;
pub mod persistence;

// Re-exports
pub use git::*;
pub use discovery::*;
pub use persistence::*;
