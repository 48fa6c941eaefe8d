//! Aggregation stage integration tests

use supplier_harvest::application::AggregationStage;
use supplier_harvest::domain::product::{AggregatedSupplierFile, PageType, ProductRecord};
use supplier_harvest::domain::supplier::SupplierIdentity;
use supplier_harvest::infrastructure::storage::RecordStore;

fn record(url: &str, title: &str) -> ProductRecord {
    let supplier = SupplierIdentity::from_url(url).unwrap();
    ProductRecord::new(url, supplier, PageType::Product)
        .with_field("title", title)
        .with_field("price", 10.0)
}

async fn seed(store: &RecordStore, records: &[ProductRecord]) {
    store.ensure_dir().await.unwrap();
    for record in records {
        store.persist(record).await.unwrap();
    }
}

fn read_aggregate(path: &std::path::Path) -> AggregatedSupplierFile {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn groups_records_by_supplier() {
    let records_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(records_dir.path());

    seed(
        &store,
        &[
            record("https://shop-a.com/p/1", "Chair"),
            record("https://shop-a.com/p/2", "Table"),
            record("https://shop-b.com/p/9", "Lamp"),
        ],
    )
    .await;

    let stage = AggregationStage::new(out_dir.path());
    let report = stage.aggregate(records_dir.path()).await.unwrap();

    assert_eq!(report.files_skipped, 0);
    assert_eq!(report.written.len(), 2);
    assert_eq!(report.written[&SupplierIdentity::from_host("shop-a.com")], 2);
    assert_eq!(report.written[&SupplierIdentity::from_host("shop-b.com")], 1);

    let shop_a = read_aggregate(&out_dir.path().join("shop-a.com.json"));
    assert_eq!(shop_a.records.len(), 2);
    assert_eq!(shop_a.supplier.as_str(), "shop-a.com");

    let shop_b = read_aggregate(&out_dir.path().join("shop-b.com.json"));
    assert_eq!(shop_b.records.len(), 1);
}

#[tokio::test]
async fn roundtrip_preserves_every_field_value() {
    let records_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(records_dir.path());

    let original = record("https://shop-a.com/p/1", "Chair")
        .with_field("images", serde_json::json!(["x.jpg", "y.jpg"]))
        .with_field("description", "Solid oak");
    seed(&store, std::slice::from_ref(&original)).await;

    let stage = AggregationStage::new(out_dir.path());
    stage.aggregate(records_dir.path()).await.unwrap();

    let aggregate = read_aggregate(&out_dir.path().join("shop-a.com.json"));
    assert_eq!(aggregate.records, vec![original]);
}

#[tokio::test]
async fn repeated_runs_produce_byte_identical_output() {
    let records_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(records_dir.path());

    seed(
        &store,
        &[
            record("https://shop-a.com/p/2", "Table"),
            record("https://shop-a.com/p/1", "Chair"),
        ],
    )
    .await;

    let stage = AggregationStage::new(out_dir.path());
    let out_path = out_dir.path().join("shop-a.com.json");

    stage.aggregate(records_dir.path()).await.unwrap();
    let first = std::fs::read(&out_path).unwrap();

    stage.aggregate(records_dir.path()).await.unwrap();
    let second = std::fs::read(&out_path).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn unreadable_files_are_skipped_and_counted() {
    let records_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(records_dir.path());

    seed(&store, &[record("https://shop-a.com/p/1", "Chair")]).await;
    std::fs::write(records_dir.path().join("broken.json"), "{not json").unwrap();

    let stage = AggregationStage::new(out_dir.path());
    let report = stage.aggregate(records_dir.path()).await.unwrap();

    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.written[&SupplierIdentity::from_host("shop-a.com")], 1);
}

#[tokio::test]
async fn supplier_identity_is_recomputed_from_source_url() {
    let records_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(records_dir.path());

    // Stored supplier field is stale; the source URL is authoritative.
    let mislabeled = ProductRecord::new(
        "https://shop-a.com/p/1",
        SupplierIdentity::from_host("stale.example"),
        PageType::Product,
    )
    .with_field("title", "Chair");
    seed(&store, &[mislabeled]).await;

    let stage = AggregationStage::new(out_dir.path());
    let report = stage.aggregate(records_dir.path()).await.unwrap();

    assert!(out_dir.path().join("shop-a.com.json").exists());
    assert!(!out_dir.path().join("stale.example.json").exists());
    assert_eq!(report.written[&SupplierIdentity::from_host("shop-a.com")], 1);
}

#[tokio::test]
async fn aggregation_overwrites_previous_supplier_file() {
    let records_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(records_dir.path());

    seed(
        &store,
        &[
            record("https://shop-a.com/p/1", "Chair"),
            record("https://shop-a.com/p/2", "Table"),
        ],
    )
    .await;
    let stage = AggregationStage::new(out_dir.path());
    stage.aggregate(records_dir.path()).await.unwrap();
    assert_eq!(
        read_aggregate(&out_dir.path().join("shop-a.com.json")).records.len(),
        2
    );

    // Shrink the source set; the rebuild replaces, never merges.
    std::fs::remove_dir_all(records_dir.path()).unwrap();
    let store = RecordStore::new(records_dir.path());
    seed(&store, &[record("https://shop-a.com/p/3", "Lamp")]).await;

    stage.aggregate(records_dir.path()).await.unwrap();
    let rebuilt = read_aggregate(&out_dir.path().join("shop-a.com.json"));
    assert_eq!(rebuilt.records.len(), 1);
    assert_eq!(rebuilt.records[0].source_url, "https://shop-a.com/p/3");
}
