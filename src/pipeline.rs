//! Batch job: load, derive features, write

use std::path::PathBuf;

use crate::data::{DataLoader, DataWriter, Frame};
use crate::error::Result;
use crate::preprocessing::FeatureEngineer;
use crate::types::PipelineConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub columns: Vec<String>,
    pub train_output: PathBuf,
    pub test_output: PathBuf,
}

/// Loads both raw tables and returns the fully derived unified table.
pub fn build_features(config: &PipelineConfig) -> Result<Frame> {
    config.validate()?;
    let frame = DataLoader::load_unified(
        config.raw_train_path(),
        config.raw_test_path(),
        config.label_sentinel,
    )?;
    FeatureEngineer::new(config.features.clone()).process(frame)
}

pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let frame = build_features(config)?;

    let train_output = config.processed_train_path();
    let test_output = config.processed_test_path();
    let sizes =
        DataWriter::write_partitions(&frame, config.label_sentinel, &train_output, &test_output)?;

    Ok(RunSummary {
        train_rows: sizes.labeled,
        test_rows: sizes.unlabeled,
        columns: frame.column_names().to_vec(),
        train_output,
        test_output,
    })
}
