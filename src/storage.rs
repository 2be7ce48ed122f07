use crate::errors::DataError;
use crate::models::Dataset;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/three_months_data.json")
}

/// Reads the daily feed. A missing or malformed file is an integrity error, never an empty dataset.
pub async fn load_dataset(path: &Path) -> Result<Dataset, DataError> {
    let bytes = fs::read(path).await.inspect_err(|err| {
        error!("failed to read dataset {}: {err}", path.display());
    })?;
    let dataset = Dataset::from_json(&bytes).inspect_err(|err| {
        error!("rejected dataset {}: {err}", path.display());
    })?;

    info!(records = dataset.len(), "loaded dataset from {}", path.display());
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("habit_analytics_{}_{name}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn load_dataset_reads_feed() {
        let path = temp_path("valid");
        fs::write(
            &path,
            r#"[{"Date": "30-06-2025", "Score": 40, "Categories": {"SS1": 4}},
                {"Date": "01-07-2025", "Score": 55, "Categories": {"SS2": 9}}]"#,
        )
        .await
        .unwrap();

        let dataset = load_dataset(&path).await.unwrap();
        assert_eq!(dataset.len(), 2);
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn load_dataset_fails_fast_on_bad_dates() {
        let path = temp_path("bad_date");
        fs::write(&path, r#"[{"Date": "2025-06-30", "Score": 40, "Categories": {}}]"#)
            .await
            .unwrap();

        let err = load_dataset(&path).await.unwrap_err();
        assert!(matches!(err, DataError::MalformedDate(_)));
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn load_dataset_reports_missing_file() {
        let err = load_dataset(&temp_path("missing")).await.unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }
}
