use house_price::valuation::{BuildYearBucket, MarketProfile, ProfileStore};
use std::fs;
use tempfile::tempdir;

fn populated_profile() -> MarketProfile {
    let mut profile = MarketProfile::default();
    profile.base_price_m2 = 4123.5;
    profile.annual_growth_rate = 0.031;
    profile
        .city_base_price_m2
        .insert("Zwolle".to_string(), 3890.25);
    profile
        .city_base_price_m2
        .insert("Amsterdam".to_string(), 7810.0);
    profile
        .energy_label_adjustments
        .insert("A5".to_string(), 0.0725);
    profile
        .micro_location_house_type_neutralize
        .entry("Licht extra vraag".to_string())
        .or_default()
        .insert("Corner".to_string());
    profile.build_year_buckets.push(BuildYearBucket {
        min_year: Some(2030),
        max_year: None,
        adjustment: 0.045,
    });
    profile.lot_size_ratio_median = 1.8333333333333333;
    profile
}

#[test]
fn saved_document_round_trips_byte_for_byte() {
    let dir = tempdir().expect("temp dir");
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    populated_profile().save(&first).expect("first save");
    let loaded = MarketProfile::load(&first).expect("load");
    loaded.save(&second).expect("second save");

    let original = fs::read_to_string(&first).expect("read first");
    let resaved = fs::read_to_string(&second).expect("read second");
    assert_eq!(original, resaved);
    assert_eq!(loaded, populated_profile());
}

#[test]
fn document_keys_are_sorted_within_tables() {
    let document = populated_profile().to_json_string().expect("serialize");
    let amsterdam = document.find("\"Amsterdam\"").expect("Amsterdam present");
    let zwolle = document.find("\"Zwolle\"").expect("Zwolle present");
    assert!(amsterdam < zwolle);
    assert!(document.ends_with("}\n"));
}

#[test]
fn older_documents_load_with_defaults_for_new_fields() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("legacy.json");
    fs::write(
        &path,
        r#"{
  "base_price_m2": 3900.0,
  "garden_adjustments": {"Back": 0.01},
  "toilet_adjustments": {"1 bath, 1 toilet": 0.0},
  "energy_label_adjustments": {"A": 0.05}
}"#,
    )
    .expect("write legacy profile");

    let profile = MarketProfile::load(&path).expect("legacy profile loads");
    let defaults = MarketProfile::default();
    assert_eq!(profile.base_price_m2, 3900.0);
    assert_eq!(profile.energy_label_adjustments.len(), 1);
    assert_eq!(profile.small_home_reference_m2, defaults.small_home_reference_m2);
    assert_eq!(profile.micro_segment_base_uplift, defaults.micro_segment_base_uplift);
}

#[test]
fn store_initialises_and_resets() {
    let dir = tempdir().expect("temp dir");
    let store = ProfileStore::new(
        dir.path().join("configs/market_profile.json"),
        dir.path().join("configs/market_profile.default.json"),
    );

    store.save(&MarketProfile::default()).expect("initial save");
    assert!(store.ensure_default_snapshot().expect("snapshot"));

    store.save(&populated_profile()).expect("edit");
    assert_eq!(store.load_or_default().expect("reload"), populated_profile());

    let restored = store.reset_to_default().expect("reset");
    assert_eq!(restored, MarketProfile::default());
    let active = fs::read_to_string(store.path()).expect("active document");
    let snapshot = fs::read_to_string(store.default_path()).expect("snapshot document");
    assert_eq!(active, snapshot);
}
