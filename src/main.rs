/// Processes the raw Titanic tables into train/test feature files

use std::fs::File;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use titanic_features::PipelineConfig;

const CONFIG_ENV: &str = "TITANIC_PIPELINE_CONFIG";

fn load_config() -> anyhow::Result<PipelineConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            serde_json::from_reader(file)
                .with_context(|| format!("Failed to parse config file: {:?}", path))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config()?;
    config.validate()?;
    tracing::info!(
        "Processing {} and {}",
        config.raw_train_path().display(),
        config.raw_test_path().display()
    );

    let summary = titanic_features::run(&config).context("Feature pipeline failed")?;
    tracing::info!(
        "Done: {} train rows -> {}, {} test rows -> {}, {} columns",
        summary.train_rows,
        summary.train_output.display(),
        summary.test_rows,
        summary.test_output.display(),
        summary.columns.len()
    );
    Ok(())
}
