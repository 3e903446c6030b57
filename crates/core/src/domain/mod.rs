pub mod repo;
pub mod events;
pub mod settings;

// Re-exports for convenience
pub use repo::*;
pub use events::*;
pub use settings::*;
