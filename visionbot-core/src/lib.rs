pub mod config;
pub mod types;

// Keep the public surface small and intentional.
pub use config::*;
pub use types::*;
