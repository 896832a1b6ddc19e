use chrono::NaiveDate;
use house_price::valuation::{
    AdjustmentTable, CalibrationReport, EstimateRange, EstimateResult, ScenarioComparison,
};

fn eur(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    if rounded < 0 {
        format!("EUR -{grouped}")
    } else {
        format!("EUR {grouped}")
    }
}

fn pct(fraction: f64) -> String {
    format!("{:+.1}%", fraction * 100.0)
}

fn render_range(label: &str, range: &EstimateRange) {
    println!(
        "{}: {} - {} (±{:.0}%)",
        label,
        eur(range.low),
        eur(range.high),
        range.uncertainty_pct * 100.0
    );
}

pub(crate) fn render_estimate(result: &EstimateResult, valued_on: NaiveDate, horizon_year: i32) {
    println!("Property valuation (as of {valued_on}, horizon {horizon_year})");
    println!(
        "Base: {:.1} m² at {}/m² -> {}",
        result.living_area,
        eur(result.base_price_m2),
        eur(result.base_value)
    );

    println!("Adjustments");
    for (name, value) in result.adjustments.entries() {
        if value != 0.0 {
            println!("- {}: {}", name, pct(value));
        }
    }
    println!("Total adjustment: {}", pct(result.total_adjustment));
    println!("Market multiplier: {:.4}", result.market_multiplier);
    println!("Estimate: {}", eur(result.estimate));
    render_range("Range", &result.estimate_range);

    if let Some(renovation) = &result.renovation {
        println!("\nRenovation");
        println!("- budget: {}", eur(renovation.budget));
        println!("- label uplift: {}", pct(renovation.label_uplift));
        println!("- budget uplift: {}", pct(renovation.roi_uplift));
        println!("- total uplift: {}", pct(renovation.total_uplift));
        println!("Renovated value: {}", eur(renovation.renovated_value));
        render_range("Renovated range", &renovation.renovated_range);
    }
}

pub(crate) fn render_comparison(comparison: &ScenarioComparison, valued_on: NaiveDate) {
    println!("Renovation plan comparison (as of {valued_on})");
    println!(
        "Condition: {} -> {}",
        comparison.condition_before.as_deref().unwrap_or("unknown"),
        comparison.suggested_condition
    );
    println!("Renovation budget: {}", eur(comparison.renovation_budget));
    println!("Value without renovation: {}", eur(comparison.current.estimate));
    render_range("  range", &comparison.current.estimate_range);

    let renovated = comparison
        .scenario
        .renovation
        .as_ref()
        .map_or(comparison.scenario.estimate, |outcome| outcome.renovated_value);
    println!("Value after plan: {}", eur(renovated));
    if let Some(outcome) = &comparison.scenario.renovation {
        render_range("  range", &outcome.renovated_range);
    }

    println!(
        "Difference: {} ({})",
        eur(comparison.value_delta),
        pct(comparison.delta_pct)
    );
    match comparison.value_per_euro {
        Some(ratio) => println!("Value per euro spent: {:.2}", ratio),
        None => println!("Value per euro spent: n/a (no budget applied)"),
    }
}

fn render_table(title: &str, table: &AdjustmentTable) {
    if table.is_empty() {
        println!("{title}: no category met the minimum count");
        return;
    }
    println!("{title}");
    for (label, value) in table {
        println!("- {}: {}", label, pct(*value));
    }
}

pub(crate) fn render_calibration(report: &CalibrationReport, output: &str) {
    println!("Calibrated market profile saved to {output}");
    println!(
        "Rows: {} read, {} dropped, {} used (min count {})",
        report.rows_read, report.rows_dropped, report.rows_used, report.min_count
    );
    println!("Median price: {}/m²", eur(report.median_price_per_m2));
    println!("Cities with their own price: {}", report.cities);
    println!("Lot-size ratio median: {:.3}", report.lot_size_ratio_median);
    render_table("Garden types", &report.garden_adjustments);
    render_table("Roof types", &report.roof_adjustments);
    render_table("Sanitary", &report.toilet_adjustments);
    render_table("Floors", &report.floors_adjustments);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eur_groups_thousands() {
        assert_eq!(eur(348_600.4), "EUR 348.600");
        assert_eq!(eur(1_250_000.0), "EUR 1.250.000");
        assert_eq!(eur(-1_500.0), "EUR -1.500");
        assert_eq!(eur(999.0), "EUR 999");
    }

    #[test]
    fn pct_is_signed() {
        assert_eq!(pct(0.04), "+4.0%");
        assert_eq!(pct(-0.125), "-12.5%");
    }
}
