//! Writing of the processed partitions

use std::fs::File;
use std::path::Path;

use csv::Writer;

use super::frame::Frame;
use crate::error::{PipelineError, Result};
use crate::types::columns;

/// Row counts of the two written partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSizes {
    pub labeled: usize,
    pub unlabeled: usize,
}

pub struct DataWriter;

impl DataWriter {
    /// Splits the table on the label sentinel and writes both partitions. The
    /// unlabeled partition is written without the label column.
    pub fn write_partitions<P: AsRef<Path>, Q: AsRef<Path>>(
        frame: &Frame,
        label_sentinel: i64,
        train_path: P,
        test_path: Q,
    ) -> Result<PartitionSizes> {
        let (labeled, mut unlabeled) = Self::split(frame, label_sentinel)?;
        unlabeled.remove(columns::SURVIVED);

        Self::write_frame(&labeled, train_path.as_ref())?;
        Self::write_frame(&unlabeled, test_path.as_ref())?;

        let sizes = PartitionSizes {
            labeled: labeled.len(),
            unlabeled: unlabeled.len(),
        };
        tracing::info!(
            "Wrote {} labeled rows to {} and {} unlabeled rows to {}",
            sizes.labeled,
            train_path.as_ref().display(),
            sizes.unlabeled,
            test_path.as_ref().display()
        );
        Ok(sizes)
    }

    /// `(labeled, unlabeled)` partitions, both still carrying the label column.
    pub fn split(frame: &Frame, label_sentinel: i64) -> Result<(Frame, Frame)> {
        let labels = frame.ints(columns::SURVIVED)?;
        let is_unlabeled: Vec<bool> = labels.iter().map(|l| *l == Some(label_sentinel)).collect();
        let is_labeled: Vec<bool> = is_unlabeled.iter().map(|u| !u).collect();
        Ok((frame.filter(&is_labeled), frame.filter(&is_unlabeled)))
    }

    /// Writes the frame with the passenger id as the first column.
    pub fn write_frame(frame: &Frame, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| PipelineError::sink_write(path, e))?;
        let mut writer = Writer::from_writer(file);
        let sink = |e: csv::Error| PipelineError::sink_write(path, e);

        let header = std::iter::once(columns::PASSENGER_ID)
            .chain(frame.column_names().iter().map(String::as_str));
        writer.write_record(header).map_err(sink)?;

        for (row, id) in frame.index().iter().enumerate() {
            let record = std::iter::once(id.to_string())
                .chain(frame.columns().map(|(_, column)| column.format_cell(row)));
            writer.write_record(record).map_err(sink)?;
        }

        writer.flush().map_err(|e| PipelineError::sink_write(path, e))?;
        Ok(())
    }
}
