use house_price::valuation::{
    EstimateError, FeatureValue, MarketProfile, PriceEstimator, PropertyFeatures,
};

fn close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn detached_house() -> PropertyFeatures {
    PropertyFeatures {
        living_area: Some(FeatureValue::from(140.0)),
        rooms: Some(FeatureValue::from("6 kamers")),
        build_year: Some(FeatureValue::from(1998)),
        lot_size: Some(FeatureValue::from(400.0)),
        garden_area: Some(FeatureValue::from(120.0)),
        bathrooms: Some(FeatureValue::from(2)),
        toilets: Some(FeatureValue::from(2)),
        city: Some("Amersfoort".to_string()),
        energy_label: Some("a+".to_string()),
        build_type: Some("Bestaande bouw".to_string()),
        house_type: Some("Detached".to_string()),
        condition: Some("Goed".to_string()),
        micro_location: Some("Licht extra vraag".to_string()),
        position: Some("Park".to_string()),
        ..PropertyFeatures::default()
    }
}

#[test]
fn living_area_alone_prices_from_national_base() {
    let profile = MarketProfile::default();
    let estimator = PriceEstimator::new(&profile);
    let features = PropertyFeatures::with_living_area(108.0);

    let result = estimator.estimate(&features, 0).expect("estimate succeeds");

    close(result.base_price_m2, 3500.0);
    close(result.base_value, 348_600.0);
    close(result.estimate, 348_600.0);
    close(result.market_multiplier, 1.0);
    assert!(result.adjustments.entries().iter().all(|(_, value)| *value == 0.0));
    close(result.total_adjustment, 0.0);
    close(result.estimate_range.uncertainty_pct, profile.estimate_uncertainty_base);
    assert!(result.renovation.is_none());
}

#[test]
fn missing_or_unparseable_living_area_fails() {
    let profile = MarketProfile::default();
    let estimator = PriceEstimator::new(&profile);

    let empty = PropertyFeatures::default();
    assert_eq!(
        estimator.estimate(&empty, 0).expect_err("no living area"),
        EstimateError::MissingLivingArea
    );

    let garbage = PropertyFeatures::with_living_area("groot");
    assert_eq!(
        estimator.estimate(&garbage, 0).expect_err("garbage living area"),
        EstimateError::MissingLivingArea
    );
}

#[test]
fn unknown_labels_degrade_to_neutral() {
    let profile = MarketProfile::default();
    let estimator = PriceEstimator::new(&profile);
    let features = PropertyFeatures {
        city: Some("Atlantis".to_string()),
        energy_label: Some("Z".to_string()),
        house_type: Some("Castle".to_string()),
        condition: Some("".to_string()),
        micro_location: Some("".to_string()),
        neighborhood_price_m2: Some(FeatureValue::from("onbekend")),
        ..PropertyFeatures::with_living_area(108.0)
    };

    let result = estimator.estimate(&features, 0).expect("estimate succeeds");
    close(result.estimate, 348_600.0);
}

#[test]
fn city_neighborhood_and_segment_shape_base_price() {
    let mut profile = MarketProfile::default();
    profile
        .city_base_price_m2
        .insert("Utrecht".to_string(), 5000.0);
    let estimator = PriceEstimator::new(&profile);

    let features = PropertyFeatures {
        city: Some(" Utrecht ".to_string()),
        neighborhood_price_m2: Some(FeatureValue::from("6.000")),
        micro_location: Some("Duidelijk extra vraag".to_string()),
        ..PropertyFeatures::with_living_area(60.0)
    };

    // 0.7 * 6000 + 0.3 * 5000 = 5700, lifted 6% by the segment
    close(estimator.base_price_m2(&features), 5700.0 * 1.06);
}

#[test]
fn full_feature_record_sums_adjustments() {
    let mut profile = MarketProfile::default();
    profile.lot_size_ratio_median = 2.0;
    let estimator = PriceEstimator::new(&profile);

    let result = estimator.estimate(&detached_house(), 0).expect("estimate succeeds");
    let adjustments = result.adjustments;

    close(adjustments.energy_label, 0.045);
    close(adjustments.build_type, 0.0);
    close(adjustments.house_type, 0.10);
    close(adjustments.garden, 0.03);
    close(adjustments.position, 0.03);
    close(adjustments.build_year, 0.0);
    close(adjustments.bathrooms, 0.02);
    close(adjustments.toilets, 0.01);
    close(adjustments.condition, 0.04);
    close(adjustments.small_home, 0.0);
    // 400 / 140 = 2.857 against a median of 2.0 -> 0.4286 * 0.15, clamped at 0.06
    close(adjustments.lot_size, 0.06);
    // 140 / 30 = 4.667 expected rooms, 6 present -> 1.333 * 0.02 - 0.333 * 0.03
    close(adjustments.rooms, (6.0 - 140.0 / 30.0) * 0.02 - (6.0 - 140.0 / 30.0 - 1.0) * 0.03);

    close(result.total_adjustment, profile.max_adjustment);
    close(result.estimate, result.base_value * (1.0 + profile.max_adjustment));
}

#[test]
fn premium_segment_suppresses_house_type_position_and_lot_size() {
    let mut profile = MarketProfile::default();
    profile.lot_size_ratio_median = 2.0;
    let estimator = PriceEstimator::new(&profile);
    let features = PropertyFeatures {
        micro_location: Some("Zeer hoge extra vraag".to_string()),
        ..detached_house()
    };

    let result = estimator.estimate(&features, 0).expect("estimate succeeds");
    close(result.adjustments.house_type, 0.0);
    close(result.adjustments.position, 0.0);
    close(result.adjustments.lot_size, 0.0);
    close(result.adjustments.garden, 0.03);
}

#[test]
fn garden_threshold_sits_at_ten_square_metres() {
    let profile = MarketProfile::default();
    let estimator = PriceEstimator::new(&profile);
    let with_garden = |area: f64| PropertyFeatures {
        garden_area: Some(FeatureValue::from(area)),
        house_type: Some("Apartment".to_string()),
        ..PropertyFeatures::with_living_area(75.0)
    };

    let below = estimator.estimate(&with_garden(9.99), 0).expect("estimate succeeds");
    let at = estimator.estimate(&with_garden(10.0), 0).expect("estimate succeeds");

    close(below.adjustments.garden, 0.0);
    close(at.adjustments.garden, 0.03);
}

#[test]
fn total_adjustment_respects_bounds_for_extreme_profiles() {
    let mut profile = MarketProfile::default();
    profile.energy_label_adjustments.insert("G".to_string(), -5.0);
    profile.condition_adjustments.insert("Uitstekend".to_string(), 7.0);
    let estimator = PriceEstimator::new(&profile);

    let worst = PropertyFeatures {
        energy_label: Some("G".to_string()),
        ..PropertyFeatures::with_living_area(100.0)
    };
    let best = PropertyFeatures {
        condition: Some("Uitstekend".to_string()),
        ..PropertyFeatures::with_living_area(100.0)
    };

    let low = estimator.estimate(&worst, 0).expect("estimate succeeds");
    let high = estimator.estimate(&best, 0).expect("estimate succeeds");
    close(low.total_adjustment, profile.min_adjustment);
    close(high.total_adjustment, profile.max_adjustment);
    assert!(low.estimate_range.uncertainty_pct <= 0.25);
    assert!(high.estimate_range.uncertainty_pct >= 0.02);
}

#[test]
fn room_adjustment_is_capped_for_absurd_room_counts() {
    let profile = MarketProfile::default();
    let estimator = PriceEstimator::new(&profile);
    for rooms in [0.0, 1.0, 40.0, 400.0] {
        let features = PropertyFeatures {
            rooms: Some(FeatureValue::from(rooms)),
            ..PropertyFeatures::with_living_area(120.0)
        };
        let result = estimator.estimate(&features, 0).expect("estimate succeeds");
        assert!(result.adjustments.rooms.abs() <= profile.room_adjustment_cap + 1e-12);
    }
}

#[test]
fn estimate_grows_with_horizon() {
    let profile = MarketProfile::default();
    let estimator = PriceEstimator::new(&profile);
    let features = PropertyFeatures::with_living_area(90.0);

    let mut previous = estimator.estimate(&features, 0).expect("estimate succeeds").estimate;
    for years in 1..=10 {
        let current = estimator.estimate(&features, years).expect("estimate succeeds");
        close(current.market_multiplier, 1.04_f64.powi(years));
        assert!(current.estimate > previous);
        previous = current.estimate;
    }

    let negative = estimator.estimate(&features, -3).expect("estimate succeeds");
    close(negative.market_multiplier, 1.0);
}

#[test]
fn small_home_premium_applies_below_reference() {
    let profile = MarketProfile::default();
    let estimator = PriceEstimator::new(&profile);
    let result = estimator
        .estimate(&PropertyFeatures::with_living_area(55.0), 0)
        .expect("estimate succeeds");
    // a quarter of the way from 50 m2 to the 70 m2 reference
    close(result.adjustments.small_home, 0.075);
}

#[test]
fn descriptive_room_text_counts_living_rooms_only() {
    let profile = MarketProfile::default();
    let estimator = PriceEstimator::new(&profile);
    let features = PropertyFeatures {
        rooms: Some(FeatureValue::from("5 kamers (3 slaapkamers)")),
        ..PropertyFeatures::with_living_area(150.0)
    };

    let result = estimator.estimate(&features, 0).expect("estimate succeeds");
    // 150 / 30 = 5 expected rooms, 5 present
    close(result.adjustments.rooms, 0.0);
}
