//! Feature engineering for the passenger table
//!
//! The deriver is an ordered list of named steps. Every step owns the table,
//! transforms it and hands it back, so each one can be run on its own.

use std::collections::BTreeSet;

use super::binning::QuantileBinner;
use super::imputation::MissingValueImputer;
use crate::data::{Column, Frame};
use crate::error::{PipelineError, Result};
use crate::types::{columns, AgeState, FareBin, FeatureConfig, TitleTable};

/// Categorical columns replaced by indicator columns, in output order.
pub const ENCODED_COLUMNS: [&str; 6] = [
    columns::DECK,
    columns::PCLASS,
    columns::TITLE,
    columns::FARE_BIN,
    columns::EMBARKED,
    columns::AGE_STATE,
];

/// Raw columns subsumed by derived ones.
pub const DROPPED_COLUMNS: [&str; 6] = [
    columns::CABIN,
    columns::NAME,
    columns::TICKET,
    columns::PARCH,
    columns::SIBSP,
    columns::SEX,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStep {
    ExtractTitle,
    ImputeMissing,
    BinFare,
    AgeState,
    FamilySize,
    MotherFlag,
    NormalizeCabin,
    ExtractDeck,
    SexFlag,
    OneHotEncode,
    DropRawColumns,
    ReorderColumns,
}

impl FeatureStep {
    pub const ORDER: [FeatureStep; 12] = [
        FeatureStep::ExtractTitle,
        FeatureStep::ImputeMissing,
        FeatureStep::BinFare,
        FeatureStep::AgeState,
        FeatureStep::FamilySize,
        FeatureStep::MotherFlag,
        FeatureStep::NormalizeCabin,
        FeatureStep::ExtractDeck,
        FeatureStep::SexFlag,
        FeatureStep::OneHotEncode,
        FeatureStep::DropRawColumns,
        FeatureStep::ReorderColumns,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureStep::ExtractTitle => "extract_title",
            FeatureStep::ImputeMissing => "impute_missing",
            FeatureStep::BinFare => "bin_fare",
            FeatureStep::AgeState => "age_state",
            FeatureStep::FamilySize => "family_size",
            FeatureStep::MotherFlag => "mother_flag",
            FeatureStep::NormalizeCabin => "normalize_cabin",
            FeatureStep::ExtractDeck => "extract_deck",
            FeatureStep::SexFlag => "sex_flag",
            FeatureStep::OneHotEncode => "one_hot_encode",
            FeatureStep::DropRawColumns => "drop_raw_columns",
            FeatureStep::ReorderColumns => "reorder_columns",
        }
    }

    pub fn apply(self, frame: Frame, config: &FeatureConfig) -> Result<Frame> {
        match self {
            FeatureStep::ExtractTitle => FeatureEngineer::extract_titles(frame, &config.titles),
            FeatureStep::ImputeMissing => MissingValueImputer::new(config).fit_transform(frame),
            FeatureStep::BinFare => FeatureEngineer::bin_fares(frame),
            FeatureStep::AgeState => {
                FeatureEngineer::age_states(frame, config.adult_age_threshold)
            }
            FeatureStep::FamilySize => FeatureEngineer::family_sizes(frame),
            FeatureStep::MotherFlag => {
                FeatureEngineer::mother_flags(frame, config.adult_age_threshold)
            }
            FeatureStep::NormalizeCabin => {
                FeatureEngineer::normalize_cabins(frame, &config.cabin_outliers)
            }
            FeatureStep::ExtractDeck => FeatureEngineer::extract_decks(frame, &config.unknown_deck),
            FeatureStep::SexFlag => FeatureEngineer::sex_flags(frame),
            FeatureStep::OneHotEncode => FeatureEngineer::one_hot_encode(frame, &ENCODED_COLUMNS),
            FeatureStep::DropRawColumns => {
                Ok(FeatureEngineer::drop_columns(frame, &DROPPED_COLUMNS))
            }
            FeatureStep::ReorderColumns => FeatureEngineer::label_first(frame),
        }
    }
}

pub struct FeatureEngineer {
    config: FeatureConfig,
}

impl FeatureEngineer {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Runs every step in order.
    pub fn process(&self, mut frame: Frame) -> Result<Frame> {
        for step in FeatureStep::ORDER {
            frame = step.apply(frame, &self.config)?;
            tracing::debug!(
                "Step {} done: {} rows, {} columns",
                step.name(),
                frame.len(),
                frame.column_names().len()
            );
        }
        tracing::info!("Derived {} feature columns", frame.column_names().len());
        Ok(frame)
    }

    /// Adds `Title` from `"<surname>, <title>. <given names>"`.
    pub fn extract_titles(mut frame: Frame, table: &TitleTable) -> Result<Frame> {
        let titles = frame
            .texts(columns::NAME)?
            .iter()
            .zip(frame.index())
            .map(|(name, &id)| {
                let name = name.as_deref().unwrap_or_default();
                let raw = raw_title(name).ok_or_else(|| PipelineError::MalformedName {
                    passenger_id: id,
                    name: name.to_string(),
                })?;
                table
                    .lookup(&raw)
                    .map(|title| Some(title.as_str().to_string()))
                    .ok_or(PipelineError::UnknownTitle {
                        passenger_id: id,
                        title: raw,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        frame.insert(columns::TITLE, Column::Text(titles));
        Ok(frame)
    }

    /// Adds `Fare_Bin` from the quartiles of the imputed fares.
    pub fn bin_fares(mut frame: Frame) -> Result<Frame> {
        let fares = frame
            .floats(columns::FARE)?
            .iter()
            .copied()
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| {
                PipelineError::imputation(columns::FARE, "fares must be imputed before binning")
            })?;

        let mut binner = QuantileBinner::new(FareBin::ALL.len());
        let bins = binner.fit_transform(&fares)?;
        tracing::debug!("Fare quartile edges: {:?}", binner.edges());

        let labels = bins
            .into_iter()
            .map(|b| Some(FareBin::ALL[b].as_str().to_string()))
            .collect();
        frame.insert(columns::FARE_BIN, Column::Text(labels));
        Ok(frame)
    }

    /// Adds `AgeState`: `Adult` strictly above the threshold, `Child` otherwise.
    pub fn age_states(mut frame: Frame, threshold: f64) -> Result<Frame> {
        let states = frame
            .floats(columns::AGE)?
            .iter()
            .map(|age| {
                let state = if age.is_some_and(|a| a > threshold) {
                    AgeState::Adult
                } else {
                    AgeState::Child
                };
                Some(state.as_str().to_string())
            })
            .collect();
        frame.insert(columns::AGE_STATE, Column::Text(states));
        Ok(frame)
    }

    pub fn family_sizes(mut frame: Frame) -> Result<Frame> {
        let sizes = frame
            .ints(columns::SIBSP)?
            .iter()
            .zip(frame.ints(columns::PARCH)?)
            .map(|(sibsp, parch)| Some(sibsp.unwrap_or(0) + parch.unwrap_or(0) + 1))
            .collect();
        frame.insert(columns::FAMILY_SIZE, Column::Int(sizes));
        Ok(frame)
    }

    /// Adds `IsMother`: adult women with children who are not titled Miss.
    pub fn mother_flags(mut frame: Frame, threshold: f64) -> Result<Frame> {
        let sex = frame.texts(columns::SEX)?;
        let age = frame.floats(columns::AGE)?;
        let parch = frame.ints(columns::PARCH)?;
        let title = frame.texts(columns::TITLE)?;

        let flags = (0..frame.len())
            .map(|i| {
                let is_mother = sex[i].as_deref() == Some("female")
                    && age[i].is_some_and(|a| a > threshold)
                    && parch[i].is_some_and(|p| p > 0)
                    && title[i].as_deref() != Some("Miss");
                Some(i64::from(is_mother))
            })
            .collect();
        frame.insert(columns::IS_MOTHER, Column::Int(flags));
        Ok(frame)
    }

    /// Treats outlier cabin values as missing.
    pub fn normalize_cabins(mut frame: Frame, outliers: &[String]) -> Result<Frame> {
        let cabins = frame
            .texts(columns::CABIN)?
            .iter()
            .map(|cabin| cabin.clone().filter(|c| !outliers.contains(c)))
            .collect();
        frame.insert(columns::CABIN, Column::Text(cabins));
        Ok(frame)
    }

    /// Adds `Deck`: the uppercased first cabin letter, or `unknown` without a cabin.
    pub fn extract_decks(mut frame: Frame, unknown: &str) -> Result<Frame> {
        let decks = frame
            .texts(columns::CABIN)?
            .iter()
            .map(|cabin| {
                let deck = cabin
                    .as_deref()
                    .and_then(|c| c.chars().next())
                    .map(|c| c.to_uppercase().to_string())
                    .unwrap_or_else(|| unknown.to_string());
                Some(deck)
            })
            .collect();
        frame.insert(columns::DECK, Column::Text(decks));
        Ok(frame)
    }

    pub fn sex_flags(mut frame: Frame) -> Result<Frame> {
        let flags = frame
            .texts(columns::SEX)?
            .iter()
            .map(|sex| Some(i64::from(sex.as_deref() == Some("male"))))
            .collect();
        frame.insert(columns::IS_MALE, Column::Int(flags));
        Ok(frame)
    }

    /// Replaces each named column by `<column>_<category>` indicators, one per
    /// category present in the table.
    pub fn one_hot_encode(mut frame: Frame, names: &[&str]) -> Result<Frame> {
        for &name in names {
            let categories = Self::categories(&frame, name)?;
            let column = frame
                .remove(name)
                .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;

            for category in &categories {
                let indicator = (0..frame.len())
                    .map(|row| {
                        let hit = category_of(&column, row).as_deref() == Some(category.as_str());
                        Some(i64::from(hit))
                    })
                    .collect();
                frame.insert(&format!("{name}_{category}"), Column::Int(indicator));
            }
        }
        Ok(frame)
    }

    /// Observed categories of a column. Fare bins keep their bin order, integer
    /// categories sort numerically and text categories lexicographically.
    pub fn categories(frame: &Frame, name: &str) -> Result<Vec<String>> {
        let categories = match frame.column(name)? {
            Column::Int(values) => values
                .iter()
                .flatten()
                .copied()
                .collect::<BTreeSet<i64>>()
                .into_iter()
                .map(|v| v.to_string())
                .collect(),
            Column::Text(values) if name == columns::FARE_BIN => {
                let observed: BTreeSet<&str> =
                    values.iter().flatten().map(String::as_str).collect();
                FareBin::ALL
                    .iter()
                    .map(|bin| bin.as_str())
                    .filter(|label| observed.contains(label))
                    .map(str::to_string)
                    .collect()
            }
            Column::Text(values) => values
                .iter()
                .flatten()
                .cloned()
                .collect::<BTreeSet<String>>()
                .into_iter()
                .collect(),
            Column::Float(_) => {
                return Err(PipelineError::ColumnType {
                    name: name.to_string(),
                    expected: "categorical",
                })
            }
        };
        Ok(categories)
    }

    pub fn drop_columns(mut frame: Frame, names: &[&str]) -> Frame {
        for name in names {
            frame.remove(name);
        }
        frame
    }

    /// Moves the label column to the front.
    pub fn label_first(mut frame: Frame) -> Result<Frame> {
        frame.move_to_front(columns::SURVIVED)?;
        Ok(frame)
    }
}

/// Normalized title token of a name: the text between the first comma and the
/// next period, trimmed and lowercased.
pub fn raw_title(name: &str) -> Option<String> {
    let after_surname = name.split(',').nth(1)?;
    let title = after_surname.split('.').next().unwrap_or_default();
    Some(title.trim().to_lowercase())
}

fn category_of(column: &Column, row: usize) -> Option<String> {
    match column {
        Column::Int(values) => values[row].map(|v| v.to_string()),
        Column::Text(values) => values[row].clone(),
        Column::Float(_) => None,
    }
}
