//! Titanic features - feature engineering for the survival dataset

pub mod data;
pub mod error;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use data::{Column, DataLoader, DataWriter, Frame};
pub use error::{PipelineError, Result};
pub use preprocessing::*;
pub use types::*;

// Re-export for convenience
pub use pipeline::{run, RunSummary};
