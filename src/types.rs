/// Domain types and configuration for the feature pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::{PipelineError, Result};

/// Raw and derived column names.
pub mod columns {
    pub const PASSENGER_ID: &str = "PassengerId";
    pub const SURVIVED: &str = "Survived";
    pub const PCLASS: &str = "Pclass";
    pub const NAME: &str = "Name";
    pub const SEX: &str = "Sex";
    pub const AGE: &str = "Age";
    pub const SIBSP: &str = "SibSp";
    pub const PARCH: &str = "Parch";
    pub const TICKET: &str = "Ticket";
    pub const FARE: &str = "Fare";
    pub const CABIN: &str = "Cabin";
    pub const EMBARKED: &str = "Embarked";

    pub const TITLE: &str = "Title";
    pub const FARE_BIN: &str = "Fare_Bin";
    pub const AGE_STATE: &str = "AgeState";
    pub const FAMILY_SIZE: &str = "FamilySize";
    pub const IS_MOTHER: &str = "IsMother";
    pub const DECK: &str = "Deck";
    pub const IS_MALE: &str = "IsMale";
}

/// Canonical honorific category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Title {
    Mr,
    Mrs,
    Miss,
    Master,
    Sir,
    Officer,
    Lady,
}

impl Title {
    pub const ALL: [Title; 7] = [
        Title::Mr,
        Title::Mrs,
        Title::Miss,
        Title::Master,
        Title::Sir,
        Title::Officer,
        Title::Lady,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Title::Mr => "Mr",
            Title::Mrs => "Mrs",
            Title::Miss => "Miss",
            Title::Master => "Master",
            Title::Sir => "Sir",
            Title::Officer => "Officer",
            Title::Lady => "Lady",
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fare quartile, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FareBin {
    VeryLow,
    Low,
    High,
    VeryHigh,
}

impl FareBin {
    pub const ALL: [FareBin; 4] = [
        FareBin::VeryLow,
        FareBin::Low,
        FareBin::High,
        FareBin::VeryHigh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FareBin::VeryLow => "very_low",
            FareBin::Low => "low",
            FareBin::High => "high",
            FareBin::VeryHigh => "very_high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeState {
    Adult,
    Child,
}

impl AgeState {
    pub fn as_str(self) -> &'static str {
        match self {
            AgeState::Adult => "Adult",
            AgeState::Child => "Child",
        }
    }
}

/// Closed lookup from a normalized raw title (`"mr"`, `"the countess"`) to its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleTable {
    entries: BTreeMap<String, Title>,
}

impl TitleTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Title)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// The 18 honorifics found in the passenger manifest.
    pub fn standard() -> Self {
        Self::new([
            ("mr", Title::Mr),
            ("mrs", Title::Mrs),
            ("miss", Title::Miss),
            ("master", Title::Master),
            ("don", Title::Sir),
            ("rev", Title::Sir),
            ("dr", Title::Officer),
            ("mme", Title::Mrs),
            ("ms", Title::Mrs),
            ("major", Title::Officer),
            ("lady", Title::Lady),
            ("sir", Title::Sir),
            ("mlle", Title::Miss),
            ("col", Title::Officer),
            ("capt", Title::Officer),
            ("the countess", Title::Lady),
            ("jonkheer", Title::Sir),
            ("dona", Title::Lady),
        ])
    }

    pub fn lookup(&self, normalized: &str) -> Option<Title> {
        self.entries.get(normalized).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TitleTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Constants consumed by the feature steps.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub titles: TitleTable,
    pub embarked_fill: String,
    pub fare_group_class: i64,
    pub fare_group_port: String,
    pub adult_age_threshold: f64,
    pub cabin_outliers: Vec<String>,
    pub unknown_deck: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            titles: TitleTable::standard(),
            embarked_fill: "C".to_string(),
            fare_group_class: 3,
            fare_group_port: "S".to_string(),
            adult_age_threshold: 18.0,
            cabin_outliers: vec!["T".to_string()],
            unknown_deck: "Z".to_string(),
        }
    }
}

/// Locations and sentinel for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_train_file")]
    pub train_file: String,
    #[serde(default = "default_test_file")]
    pub test_file: String,
    #[serde(default = "default_label_sentinel")]
    pub label_sentinel: i64,
    #[serde(skip)]
    pub features: FeatureConfig,
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data").join("raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data").join("processed")
}

fn default_train_file() -> String {
    "train.csv".to_string()
}

fn default_test_file() -> String {
    "test.csv".to_string()
}

fn default_label_sentinel() -> i64 {
    -888
}

/// Valid survival labels. The sentinel must lie outside this set.
pub const LABELS: [i64; 2] = [0, 1];

pub fn check_label_sentinel(sentinel: i64) -> Result<()> {
    if LABELS.contains(&sentinel) {
        return Err(PipelineError::Config(format!(
            "label sentinel {sentinel} collides with a real label"
        )));
    }
    Ok(())
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        check_label_sentinel(self.label_sentinel)
    }

    pub fn raw_train_path(&self) -> PathBuf {
        self.raw_dir.join(&self.train_file)
    }

    pub fn raw_test_path(&self) -> PathBuf {
        self.raw_dir.join(&self.test_file)
    }

    pub fn processed_train_path(&self) -> PathBuf {
        self.processed_dir.join(&self.train_file)
    }

    pub fn processed_test_path(&self) -> PathBuf {
        self.processed_dir.join(&self.test_file)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            train_file: default_train_file(),
            test_file: default_test_file(),
            label_sentinel: default_label_sentinel(),
            features: FeatureConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_covers_manifest_titles() {
        let table = TitleTable::standard();
        assert_eq!(table.len(), 18);
        assert_eq!(table.lookup("the countess"), Some(Title::Lady));
        assert_eq!(table.lookup("jonkheer"), Some(Title::Sir));
        assert_eq!(table.lookup("mlle"), Some(Title::Miss));
        assert_eq!(table.lookup("emperor"), None);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.label_sentinel, -888);
        assert_eq!(config.raw_train_path(), PathBuf::from("data/raw/train.csv"));
        assert_eq!(config.processed_test_path(), PathBuf::from("data/processed/test.csv"));
        assert_eq!(config.features.embarked_fill, "C");
    }

    #[test]
    fn test_sentinel_must_be_outside_label_domain() {
        let config: PipelineConfig = serde_json::from_str(r#"{"label_sentinel": 0}"#).unwrap();
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
        assert!(check_label_sentinel(1).is_err());
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_partial_override() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"raw_dir": "input", "label_sentinel": -1}"#).unwrap();
        assert_eq!(config.raw_test_path(), PathBuf::from("input/test.csv"));
        assert_eq!(config.label_sentinel, -1);
        assert_eq!(config.processed_dir, PathBuf::from("data/processed"));
    }
}
