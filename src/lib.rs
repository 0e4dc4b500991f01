pub mod config;
pub mod executor;
pub mod harvest;
pub mod model;
pub mod runner;
pub mod traits;

// Re-export common types for convenience
pub use config::HarvestConfig;
pub use executor::*;
pub use model::*;
pub use runner::{run, run_with};
pub use traits::*;
