//! Conversion of a processed table into model-ready arrays

use linfa::Dataset;
use ndarray::{Array1, Array2, Ix1};

use super::frame::Frame;
use super::writer::DataWriter;
use crate::error::{PipelineError, Result};
use crate::types::columns;

/// Dense record matrix of every column except `exclude`, in column order.
/// Missing cells become NaN.
pub fn to_records(frame: &Frame, exclude: &[&str]) -> Result<(Array2<f64>, Vec<String>)> {
    let selected: Vec<_> = frame
        .columns()
        .filter(|(name, _)| !exclude.contains(name))
        .collect();

    let mut records = Array2::zeros((frame.len(), selected.len()));
    for (j, (name, column)) in selected.iter().enumerate() {
        if matches!(column, crate::data::Column::Text(_)) {
            return Err(PipelineError::ColumnType {
                name: name.to_string(),
                expected: "numeric",
            });
        }
        for i in 0..frame.len() {
            records[[i, j]] = column.as_f64(i).unwrap_or(f64::NAN);
        }
    }

    let names = selected.into_iter().map(|(name, _)| name.to_string()).collect();
    Ok((records, names))
}

/// Labeled partition as a linfa dataset with survival targets.
pub fn training_dataset(frame: &Frame, label_sentinel: i64) -> Result<Dataset<f64, usize, Ix1>> {
    let (labeled, _) = DataWriter::split(frame, label_sentinel)?;
    let (records, names) = to_records(&labeled, &[columns::SURVIVED])?;

    let targets = labeled
        .ints(columns::SURVIVED)?
        .iter()
        .map(|label| label.and_then(|l| usize::try_from(l).ok()))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| PipelineError::ColumnType {
            name: columns::SURVIVED.to_string(),
            expected: "non-negative label",
        })?;

    Ok(Dataset::new(records, Array1::from(targets)).with_feature_names(names))
}

/// Unlabeled partition as a record matrix, label column removed.
pub fn inference_records(frame: &Frame, label_sentinel: i64) -> Result<(Array2<f64>, Vec<String>)> {
    let (_, unlabeled) = DataWriter::split(frame, label_sentinel)?;
    to_records(&unlabeled, &[columns::SURVIVED])
}
