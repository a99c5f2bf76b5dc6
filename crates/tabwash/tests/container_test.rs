//! Integration tests for loading, cleaning and exporting files on disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::TempDir;

use tabwash::{
    ContainerConfig, DataContainer, ExportFormat, MissingStrategy, SemanticType, WashError,
};

/// Sensor readings with one extreme row at the end and an empty reading at label 5.
fn sensors_csv() -> String {
    let mut out = String::from("reading,load,site,day\n");
    for i in 0..31 {
        let reading = if i == 5 {
            String::new()
        } else {
            format!("{}", 10.25 + i as f64 * 0.5)
        };
        out.push_str(&format!(
            "{},{},{},2021-03-{:02}\n",
            reading,
            100 + i * 3,
            ["north", "south", "east"][i % 3],
            (i % 28) + 1
        ));
    }
    out.push_str("95.25,900,north,2021-03-28\n");
    out
}

const WEATHER: &str = "% Weather observations\n\
@relation weather\n\
\n\
@attribute outlook {sunny,overcast,rainy}\n\
@attribute temperature numeric\n\
@attribute humidity real\n\
@attribute note string\n\
\n\
@data\n\
sunny,85,85.5,'hot, dry'\n\
sunny,80,90.5,'hot, dry'\n\
overcast,83,86.5,mild\n\
rainy,70,96.5,wet\n\
rainy,68,80.5,wet\n\
rainy,65,70.5,wet\n\
overcast,64,65.5,mild\n\
sunny,72,95.5,mild\n\
sunny,69,70.25,mild\n\
rainy,75,80.25,wet\n\
sunny,71,70.75,'hot, dry'\n\
overcast,81,75.5,mild\n";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn load(path: &Path) -> DataContainer {
    DataContainer::builder()
        .path(path)
        .config(ContainerConfig {
            seed: Some(11),
            ..ContainerConfig::default()
        })
        .build()
        .expect("Failed to load container")
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_csv_from_disk() {
    let dir = TempDir::new().unwrap();
    let content = sensors_csv();
    let path = write_file(&dir, "sensors.csv", &content);

    let container = load(&path);
    let dtypes: Vec<SemanticType> = container.get_dtypes().into_values().collect();
    assert_eq!(
        dtypes,
        vec![
            SemanticType::Float,
            SemanticType::Integer,
            SemanticType::Category,
            SemanticType::DateTime
        ]
    );
    assert_eq!(container.get_dataframe().shape(), (32, 4));
    assert_eq!(container.name(), Some("sensors"));

    let metadata = container.metadata().unwrap();
    assert_eq!(metadata.format, "csv");
    assert_eq!(metadata.size_bytes, content.len() as u64);
    assert_eq!(metadata.hash.len(), 64);
}

#[test]
fn test_load_tsv_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "sensors.tsv", &sensors_csv().replace(',', "\t"));

    let container = load(&path);
    assert_eq!(container.metadata().unwrap().format, "tsv");
    assert_eq!(container.get_dataframe().shape(), (32, 4));
}

#[test]
fn test_load_arff_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "observations.arff", WEATHER);

    let container = load(&path);
    assert_eq!(container.name(), Some("weather"));
    let dtypes = container.get_dtypes();
    assert_eq!(dtypes["outlook"], SemanticType::Category);
    assert_eq!(dtypes["temperature"], SemanticType::Integer);
    assert_eq!(dtypes["humidity"], SemanticType::Float);
    assert_eq!(dtypes["note"], SemanticType::Category);
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = DataContainer::from_path(dir.path().join("absent.csv"));
    assert!(matches!(missing, Err(WashError::Io { .. })));

    let sheet = write_file(&dir, "book.xlsx", "not a spreadsheet");
    assert!(matches!(
        DataContainer::from_path(sheet),
        Err(WashError::UnsupportedFormat(_))
    ));
}

// =============================================================================
// Cleaning
// =============================================================================

#[test]
fn test_cleaning_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "sensors.csv", &sensors_csv());
    let mut container = load(&path);

    assert!(matches!(
        container.outlier(&[0, 6], 0.05),
        Err(WashError::MissingData { count: 1 })
    ));

    container.missing(MissingStrategy::Mean, &[]).unwrap();
    assert_eq!(container.get_dataframe().missing_count(), 0);
    assert_eq!(container.get_dataframe().row_count(), 32);

    let report = container.outlier(&[0, 6], 0.05).unwrap();
    assert_eq!(report.outlier_count(), 2);
    assert_eq!(report.outliers[0], 31);
    assert_eq!(report.ranked.shape(), (32, 6));
    // The stored snapshot keeps its columns
    assert_eq!(container.get_dataframe().column_count(), 4);

    let removed = container
        .remove(&report.outliers.iter().copied().collect::<BTreeSet<_>>())
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(container.get_dataframe().row_count(), 30);
}

#[test]
fn test_failed_type_update_keeps_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "sensors.csv", &sensors_csv());
    let mut container = load(&path);
    let before = container.get_dataframe().clone();

    let mut requested = IndexMap::new();
    requested.insert("load".to_string(), SemanticType::Float);
    requested.insert("site".to_string(), SemanticType::DateTime);
    assert!(container.update_dtypes(&requested).is_err());
    assert_eq!(container.get_dataframe(), &before);

    let mut requested = IndexMap::new();
    requested.insert("load".to_string(), SemanticType::Float);
    container.update_dtypes(&requested).unwrap();
    assert_eq!(container.get_dtypes()["load"], SemanticType::Float);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_csv_export_reloads_with_same_types() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "sensors.csv", &sensors_csv());
    let mut container = load(&path);
    container.missing(MissingStrategy::Median, &[]).unwrap();

    let exported = container.export(ExportFormat::Csv).unwrap();
    let out = write_file(&dir, "sensors_clean.csv", &exported);
    let reloaded = load(&out);

    assert_eq!(reloaded.get_dataframe().shape(), container.get_dataframe().shape());
    assert_eq!(reloaded.get_dtypes(), container.get_dtypes());
}

#[test]
fn test_arff_export_reloads_with_same_types() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "observations.arff", WEATHER);
    let container = load(&path);

    let exported = container.export_as("arff").unwrap();
    assert!(exported.starts_with("% Weather observations\n"));
    assert!(exported.contains("@relation weather\n"));
    assert!(exported.contains("@attribute outlook {sunny,overcast,rainy}\n"));
    assert!(exported.contains("\n@data\n"));

    let out = write_file(&dir, "observations_clean.arff", &exported);
    let reloaded = load(&out);
    assert_eq!(reloaded.name(), Some("weather"));
    assert_eq!(reloaded.get_dataframe().shape(), (12, 4));
    assert_eq!(reloaded.get_dtypes(), container.get_dtypes());
}
