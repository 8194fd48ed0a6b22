use std::collections::HashMap;
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use titanic_features::data::dataset;
use titanic_features::pipeline::build_features;
use titanic_features::{run, PipelineConfig, PipelineError};

const TRAIN: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Smith, Mr. John\",male,30,1,0,A/5 1,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C
3,1,3,\"Heikkinen, Miss. Laina\",female,26,0,0,STON/O2. 3101282,7.925,,S
4,1,1,\"Futrelle, Mrs. Jacques Heath (Lily May Peel)\",female,35,1,1,113803,53.1,c123,S
5,0,3,\"Allen, Mr. William Henry\",male,,0,0,373450,8.05,,S
6,0,1,\"Uruchurtu, Don. Manuel E\",male,40,0,0,PC 17601,27.7208,,C
7,1,2,\"Nasser, Master. Nicholas\",male,14,1,0,237736,30.0708,,
8,0,1,\"Blackwell, Mr. Stephen Weart\",male,45,0,0,113784,35.5,T,S
";

const TEST: &str = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
9,3,\"Kelly, Mr. James\",male,34.5,0,0,330911,7.8292,,Q
10,3,\"Wilkes, Mrs. James (Ellen Needs)\",female,47,1,0,363272,,,S
11,2,\"Myles, Mr. Thomas Francis\",male,62,0,0,240276,9.6875,,Q
12,1,\"Ryerson, Master. John Borie\",male,,2,2,PC 17608,262.375,B57 B59 B63 B66,C
";

fn setup(train: &str, test: &str) -> (TempDir, PipelineConfig) {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("raw");
    let processed = dir.path().join("processed");
    fs::create_dir_all(&raw).unwrap();
    fs::create_dir_all(&processed).unwrap();
    fs::write(raw.join("train.csv"), train).unwrap();
    fs::write(raw.join("test.csv"), test).unwrap();

    let config = PipelineConfig {
        raw_dir: raw,
        processed_dir: processed,
        ..PipelineConfig::default()
    };
    (dir, config)
}

/// Rows keyed by passenger id, each a map from column to cell.
fn read_rows(path: &Path) -> (Vec<String>, HashMap<String, HashMap<String, String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    let mut rows = HashMap::new();
    for record in reader.records() {
        let record = record.unwrap();
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.insert(row["PassengerId"].clone(), row);
    }
    (headers, rows)
}

#[test]
fn test_end_to_end_partitions() {
    let (_dir, config) = setup(TRAIN, TEST);
    let summary = run(&config).unwrap();
    assert_eq!(summary.train_rows, 8);
    assert_eq!(summary.test_rows, 4);

    let (train_headers, train_rows) = read_rows(&summary.train_output);
    let (test_headers, test_rows) = read_rows(&summary.test_output);
    assert_eq!(train_rows.len(), 8);
    assert_eq!(test_rows.len(), 4);

    assert_eq!(train_headers[..2], ["PassengerId", "Survived"]);
    assert!(!test_headers.iter().any(|h| h == "Survived"));
    assert_eq!(train_headers[2..], test_headers[1..]);
}

#[test]
fn test_reference_passenger() {
    let (_dir, config) = setup(TRAIN, TEST);
    let summary = run(&config).unwrap();
    let (headers, rows) = read_rows(&summary.train_output);
    let smith = &rows["1"];

    assert_eq!(smith["Survived"], "0");
    assert_eq!(smith["Age"], "30.0");
    assert_eq!(smith["FamilySize"], "2");
    assert_eq!(smith["IsMother"], "0");
    assert_eq!(smith["IsMale"], "1");
    assert_eq!(smith["Deck_Z"], "1");
    assert_eq!(smith["AgeState_Adult"], "1");
    assert_eq!(smith["AgeState_Child"], "0");
    assert_eq!(smith["Fare_Bin_very_low"], "1");
    assert_eq!(smith["Title_Mr"], "1");
    for title in headers.iter().filter(|h| h.starts_with("Title_") && *h != "Title_Mr") {
        assert_eq!(smith[title], "0", "{title}");
    }
}

#[test]
fn test_imputed_values() {
    let (_dir, config) = setup(TRAIN, TEST);
    let summary = run(&config).unwrap();
    let (_, train_rows) = read_rows(&summary.train_output);
    let (_, test_rows) = read_rows(&summary.test_output);

    // Mr ages across both partitions: 30, 45, 34.5, 62.
    assert_eq!(train_rows["5"]["Age"], "39.75");
    assert_eq!(test_rows["12"]["Age"], "14.0");
    // Class 3 fares from S: 7.25, 7.925, 8.05.
    assert_eq!(test_rows["10"]["Fare"], "7.925");
    assert_eq!(train_rows["7"]["Embarked_C"], "1");
    assert_eq!(train_rows["7"]["Embarked_S"], "0");
}

#[test]
fn test_decks_and_titles() {
    let (_dir, config) = setup(TRAIN, TEST);
    let summary = run(&config).unwrap();
    let (headers, train_rows) = read_rows(&summary.train_output);

    let decks: Vec<&str> = headers
        .iter()
        .filter_map(|h| h.strip_prefix("Deck_"))
        .collect();
    assert_eq!(decks, ["B", "C", "Z"]);
    assert_eq!(train_rows["4"]["Deck_C"], "1");
    // Cabin T counts as unknown.
    assert_eq!(train_rows["8"]["Deck_Z"], "1");
    assert_eq!(train_rows["6"]["Title_Sir"], "1");
    assert_eq!(train_rows["4"]["IsMother"], "1");
}

#[test]
fn test_one_hot_groups_partition_rows() {
    let (_dir, config) = setup(TRAIN, TEST);
    let frame = build_features(&config).unwrap();
    assert_eq!(frame.len(), 12);

    for group in ["Deck_", "Pclass_", "Title_", "Fare_Bin_", "Embarked_", "AgeState_"] {
        let indicators: Vec<_> = frame
            .columns()
            .filter(|(name, _)| name.starts_with(group))
            .map(|(_, column)| column)
            .collect();
        for row in 0..frame.len() {
            let sum: f64 = indicators.iter().filter_map(|c| c.as_f64(row)).sum();
            assert_eq!(sum, 1.0, "{group} row {row}");
        }
    }
}

#[test]
fn test_rerun_is_byte_identical() {
    let (_dir, config) = setup(TRAIN, TEST);
    let first = run(&config).unwrap();
    let train_a = fs::read(&first.train_output).unwrap();
    let test_a = fs::read(&first.test_output).unwrap();

    let second = run(&config).unwrap();
    assert_eq!(fs::read(&second.train_output).unwrap(), train_a);
    assert_eq!(fs::read(&second.test_output).unwrap(), test_a);
}

#[test]
fn test_unknown_title_aborts_run() {
    let train = TRAIN.replace("Uruchurtu, Don.", "Uruchurtu, Admiral.");
    let (_dir, config) = setup(&train, TEST);
    let err = run(&config).unwrap_err();
    match err {
        PipelineError::UnknownTitle { passenger_id, title } => {
            assert_eq!(passenger_id, 6);
            assert_eq!(title, "admiral");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!config.processed_train_path().exists());
}

#[test]
fn test_missing_source_and_sink() {
    let (dir, mut config) = setup(TRAIN, TEST);
    config.test_file = "absent.csv".to_string();
    assert!(matches!(run(&config), Err(PipelineError::SourceRead { .. })));

    config.test_file = "test.csv".to_string();
    config.processed_dir = dir.path().join("missing");
    assert!(matches!(run(&config), Err(PipelineError::SinkWrite { .. })));
}

#[test]
fn test_sentinel_colliding_with_label_aborts_run() {
    let (_dir, mut config) = setup(TRAIN, TEST);
    config.label_sentinel = 1;
    assert!(matches!(run(&config), Err(PipelineError::Config(_))));
    assert!(!config.processed_train_path().exists());
}

#[test]
fn test_training_dataset_matches_train_partition() {
    let (_dir, config) = setup(TRAIN, TEST);
    let frame = build_features(&config).unwrap();

    let train = dataset::training_dataset(&frame, config.label_sentinel).unwrap();
    assert_eq!(train.records().nrows(), 8);
    assert_eq!(train.targets().to_vec(), vec![0, 1, 1, 1, 0, 0, 1, 0]);

    let (records, names) = dataset::inference_records(&frame, config.label_sentinel).unwrap();
    assert_eq!(records.nrows(), 4);
    assert_eq!(names, train.feature_names());
    assert!(records.iter().all(|v| v.is_finite()));
}
