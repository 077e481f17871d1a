//! End-to-end tests for phonetic city resolution over sales files on disk.

use answer_forge::cities::{
    aggregate, annotate, load_sales, total_units_from_file, CityClusters, SalesQuery,
};
use answer_forge::{ResolverConfig, SalesError};
use serde_json::json;
use tempfile::TempDir;

fn sales_fixture() -> serde_json::Value {
    json!([
        {"city": "Tokyo", "product": "Pizza", "sales": 150},
        {"city": "Tokio", "product": "Pizza", "sales": 120},
        {"city": "London", "product": "Pizza", "sales": 90},
        {"city": "Londn", "product": "Pizza", "sales": 200},
        {"city": "London", "product": "Shoes", "sales": 500},
        {"city": "TOKYO", "product": "pizza", "sales": 40},
        {"city": "Mumbai", "product": "Pizza", "sales": 300},
        {"city": "Mumbay", "product": "Pizza", "sales": 310}
    ])
}

fn write_json(dir: &TempDir, value: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("sales.json");
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

#[test]
fn test_spelling_variants_aggregate_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        &json!([
            {"city": "Tokyo", "product": "Pizza", "sales": 150},
            {"city": "Tokio", "product": "Pizza", "sales": 120}
        ]),
    );
    let config = ResolverConfig::default();

    assert_eq!(
        total_units_from_file(&path, &SalesQuery::new("Tokyo", "Pizza", 100), &config).unwrap(),
        270
    );
    assert_eq!(
        total_units_from_file(&path, &SalesQuery::new("Tokyo", "Pizza", 130), &config).unwrap(),
        150
    );
}

#[test]
fn test_mixed_dataset_totals() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, &sales_fixture());
    let records = load_sales(&path).unwrap();
    let config = ResolverConfig::default();

    let tokyo = aggregate(&records, &SalesQuery::new("tokio", "PIZZA", 0), &config);
    assert_eq!(tokyo.canonical_city, "tokyo");
    assert_eq!(tokyo.total_units, 310);
    assert_eq!(tokyo.matched, 3);

    let london = aggregate(&records, &SalesQuery::new("London", "Pizza", 100), &config);
    assert_eq!(london.total_units, 200);

    let mumbai = aggregate(&records, &SalesQuery::new("Mumbai", "Pizza", 0), &config);
    assert_eq!(mumbai.total_units, 610);
}

#[test]
fn test_reclustering_canonical_output_is_stable() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, &sales_fixture());
    let records = load_sales(&path).unwrap();
    let config = ResolverConfig::default();

    let (first, annotated) = annotate(&records, &config);
    let second = CityClusters::build(annotated.iter().map(|s| s.canonical_city.as_str()), &config);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.clusters().iter().zip(second.clusters()) {
        assert_eq!(a.members, b.members);
        assert_eq!(a.canonical_name, b.canonical_name);
    }
}

#[test]
fn test_canonical_names_resolve_to_themselves() {
    let dir = TempDir::new().unwrap();
    let records = load_sales(write_json(&dir, &sales_fixture())).unwrap();
    let (clusters, _) = annotate(&records, &ResolverConfig::default());

    for cluster in clusters.clusters() {
        assert_eq!(clusters.resolve(&cluster.canonical_name), cluster.canonical_name);
    }
}

#[test]
fn test_jsonl_file_with_units_sold() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sales.jsonl");
    std::fs::write(
        &path,
        "{\"city\":\"Paris\",\"product\":\"Soap\",\"units_sold\":12}\n{\"city\":\"Pariss\",\"product\":\"Soap\",\"units_sold\":8}\n",
    )
    .unwrap();

    assert_eq!(
        total_units_from_file(&path, &SalesQuery::new("Paris", "soap", 0), &ResolverConfig::default())
            .unwrap(),
        20
    );
}

#[test]
fn test_malformed_record_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, &json!([{"city": "Tokyo", "product": "Pizza"}]));

    let err = total_units_from_file(&path, &SalesQuery::new("Tokyo", "Pizza", 0), &ResolverConfig::default())
        .unwrap_err();
    assert!(matches!(err, SalesError::InvalidRecord { index: 0, .. }));
}

#[test]
fn test_missing_sales_file() {
    let dir = TempDir::new().unwrap();
    let err = load_sales(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SalesError::InputNotFound(_)));
}
