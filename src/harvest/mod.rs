//! Harvest module - the portfolio harvesting pipeline.
//!
//! Leaf-first:
//! - **Index**: markdown index → [`Target`](crate::model::Target) list via [`index::parse_index`]
//! - **Fetch**: one deadline-bound GET per target via [`fetch::HttpFetcher`]
//! - **Extract**: page text → [`PageSignals`](crate::model::PageSignals) via [`extract::extract`]
//! - **Pipeline**: windowed scheduler via [`pipeline::HarvestPipeline`]
//! - **Checkpoint**: resumable progress via [`checkpoint::CheckpointStore`] and [`checkpoint::resume`]
//! - **Aggregate**: summary statistics and the output document via [`aggregate::assemble`]

pub mod aggregate;
pub mod checkpoint;
pub mod extract;
pub mod fetch;
pub mod index;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use checkpoint::{resume, Checkpoint, CheckpointStore};
pub use extract::extract;
pub use fetch::HttpFetcher;
pub use index::{load_index, parse_index};
pub use pipeline::{HarvestPipeline, PipelineRun, ProgressTally};
pub use report::{records_with_stack, top_stacks, StackCount};
