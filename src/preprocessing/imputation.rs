//! Missing-value imputation
//!
//! Statistics are fitted on the whole unified table, so both partitions
//! contribute to the fill values.

use std::collections::BTreeMap;

use crate::data::{Column, Frame};
use crate::error::{PipelineError, Result};
use crate::types::{columns, FeatureConfig};

pub struct MissingValueImputer {
    embarked_fill: String,
    fare_group_class: i64,
    fare_group_port: String,
    fare_fill: Option<f64>,
    age_by_title: Option<BTreeMap<String, f64>>,
}

impl MissingValueImputer {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            embarked_fill: config.embarked_fill.clone(),
            fare_group_class: config.fare_group_class,
            fare_group_port: config.fare_group_port.clone(),
            fare_fill: None,
            age_by_title: None,
        }
    }

    /// Computes the surrogate-group fare median and the per-title age medians.
    /// Requires the `Title` column.
    pub fn fit(&mut self, frame: &Frame) -> Result<()> {
        let pclass = frame.ints(columns::PCLASS)?;
        let embarked = frame.texts(columns::EMBARKED)?;
        let fares = frame.floats(columns::FARE)?;
        let titles = frame.texts(columns::TITLE)?;
        let ages = frame.floats(columns::AGE)?;

        // Missing ports count as the fill value, never as the surrogate port.
        let mut group_fares: Vec<f64> = (0..frame.len())
            .filter(|&i| pclass[i] == Some(self.fare_group_class))
            .filter(|&i| {
                embarked[i].as_deref().unwrap_or(&self.embarked_fill) == self.fare_group_port
            })
            .filter_map(|i| fares[i])
            .collect();
        self.fare_fill = median(&mut group_fares);

        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (title, age) in titles.iter().zip(ages) {
            if let (Some(title), Some(age)) = (title, age) {
                groups.entry(title.clone()).or_default().push(*age);
            }
        }
        self.age_by_title = Some(
            groups
                .into_iter()
                .filter_map(|(title, mut values)| median(&mut values).map(|m| (title, m)))
                .collect(),
        );

        tracing::debug!(
            "Imputer fitted: fare fill {:?}, {} title age groups",
            self.fare_fill,
            self.age_by_title.as_ref().map_or(0, BTreeMap::len)
        );
        Ok(())
    }

    pub fn transform(&self, mut frame: Frame) -> Result<Frame> {
        let age_by_title = self
            .age_by_title
            .as_ref()
            .ok_or_else(|| PipelineError::imputation(columns::AGE, "imputer not fitted"))?;

        let embarked: Vec<Option<String>> = frame
            .texts(columns::EMBARKED)?
            .iter()
            .map(|port| Some(port.clone().unwrap_or_else(|| self.embarked_fill.clone())))
            .collect();

        let fares = frame.floats(columns::FARE)?;
        let fares: Vec<Option<f64>> = if fares.iter().any(Option::is_none) {
            let fill = self.fare_fill.ok_or_else(|| {
                PipelineError::imputation(
                    columns::FARE,
                    format!(
                        "no known fare for class {} passengers from port {}",
                        self.fare_group_class, self.fare_group_port
                    ),
                )
            })?;
            fares.iter().map(|fare| Some(fare.unwrap_or(fill))).collect()
        } else {
            fares.to_vec()
        };

        let titles = frame.texts(columns::TITLE)?;
        let ages = frame
            .floats(columns::AGE)?
            .iter()
            .zip(titles)
            .zip(frame.index())
            .map(|((age, title), id)| match age {
                Some(age) => Ok(Some(*age)),
                None => {
                    let title = title.as_deref().ok_or_else(|| {
                        let reason = format!("passenger {id} has no title");
                        PipelineError::imputation(columns::AGE, reason)
                    })?;
                    age_by_title.get(title).copied().map(Some).ok_or_else(|| {
                        PipelineError::imputation(
                            columns::AGE,
                            format!("no known age in title group {title} (passenger {id})"),
                        )
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        frame.insert(columns::EMBARKED, Column::Text(embarked));
        frame.insert(columns::FARE, Column::Float(fares));
        frame.insert(columns::AGE, Column::Float(ages));
        Ok(frame)
    }

    pub fn fit_transform(&mut self, frame: Frame) -> Result<Frame> {
        self.fit(&frame)?;
        self.transform(frame)
    }

    pub fn fare_fill(&self) -> Option<f64> {
        self.fare_fill
    }

    pub fn age_fill(&self, title: &str) -> Option<f64> {
        self.age_by_title.as_ref()?.get(title).copied()
    }
}

/// Median of the values; the mean of the two middle values for even lengths.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
