//! Integration tests for column type inference on parsed sources.

use tabwash::data::{Column, Dataset, SemanticType, Value};
use tabwash::{discover_type_heuristic, ContainerConfig, DataContainer, InferenceConfig, TypeInferencer};

/// Load a single-column CSV and return the inferred type.
fn infer_csv(header: &str, cells: &[String]) -> SemanticType {
    let mut content = format!("{}\n", header);
    for cell in cells {
        content.push_str(cell);
        content.push('\n');
    }
    let container = DataContainer::builder()
        .contents("column.csv", content)
        .config(ContainerConfig {
            seed: Some(3),
            ..ContainerConfig::default()
        })
        .build()
        .expect("Failed to load column");
    container.get_dtypes()[header]
}

fn cells(values: impl IntoIterator<Item = impl ToString>) -> Vec<String> {
    values.into_iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Sampled vote
// =============================================================================

#[test]
fn test_iso_dates_are_datetime() {
    let days = cells((1..=28).map(|d| format!("2020-01-{:02}", d)));
    assert_eq!(infer_csv("day", &days), SemanticType::DateTime);
}

#[test]
fn test_slash_dates_are_datetime() {
    let days = cells((1..=28).map(|d| format!("{:02}/03/2019", d)));
    assert_eq!(infer_csv("day", &days), SemanticType::DateTime);
}

#[test]
fn test_fractional_numbers_are_float() {
    let values = cells((0..50).map(|i| format!("{}.5", i)));
    assert_eq!(infer_csv("weight", &values), SemanticType::Float);
}

#[test]
fn test_whole_numbers_are_integer() {
    assert_eq!(infer_csv("count", &cells(1..=100)), SemanticType::Integer);
}

#[test]
fn test_free_text_is_object() {
    let names = cells((0..40).map(|i| format!("sample {}", i)));
    assert_eq!(infer_csv("label", &names), SemanticType::Object);
}

// =============================================================================
// Cardinality rules
// =============================================================================

#[test]
fn test_two_numeric_values_are_boolean() {
    let flags = cells((0..20).map(|i| i % 2));
    assert_eq!(infer_csv("flag", &flags), SemanticType::Boolean);
}

#[test]
fn test_two_text_values_are_category() {
    let answers = cells((0..20).map(|i| if i % 3 == 0 { "yes" } else { "no" }));
    assert_eq!(infer_csv("answer", &answers), SemanticType::Category);
}

#[test]
fn test_few_distinct_values_are_category() {
    let grades = cells((0..60).map(|i| (i % 9) * 10));
    assert_eq!(infer_csv("grade", &grades), SemanticType::Category);
}

#[test]
fn test_missing_cells_are_ignored() {
    let flags = cells((0..20).map(|i| match i % 4 {
        0 => "NA",
        1 => "1",
        _ => "0",
    }));
    assert_eq!(infer_csv("flag", &flags), SemanticType::Boolean);
}

// =============================================================================
// Dataset level
// =============================================================================

#[test]
fn test_discover_type_heuristic_aligns_with_columns() {
    let ids = Column::new(
        "id",
        (0..30).map(Value::Integer).collect(),
        SemanticType::Integer,
    );
    let kind = Column::new(
        "kind",
        (0..30).map(|i| Value::from(["a", "b", "c"][i % 3])).collect(),
        SemanticType::Object,
    );
    let dataset = Dataset::new(vec![ids, kind]).unwrap();

    assert_eq!(
        discover_type_heuristic(&dataset),
        vec![SemanticType::Integer, SemanticType::Category]
    );
}

#[test]
fn test_category_threshold_is_configurable() {
    let inferencer = TypeInferencer::with_config(InferenceConfig {
        category_threshold: 3,
        ..InferenceConfig::default()
    });
    let values: Vec<Value> = (0..12).map(|i| Value::Integer(i % 5)).collect();
    let mut rng = fastrand::Rng::with_seed(1);

    assert_eq!(inferencer.infer(&values, &mut rng), SemanticType::Integer);
    assert_eq!(
        TypeInferencer::new().infer(&values, &mut rng),
        SemanticType::Category
    );
}
