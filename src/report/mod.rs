//! Report renderers for product check results.
//!
//! - [`terminal`]: colored, tabular output with summary box; respects `--verbose` / `--quiet`.
//! - [`pdf`]: multi-page PDF with a cover of stat cards and one page per product.
//! - [`render_json`]: pretty-printed reports for machine consumption.

pub mod pdf;
pub mod terminal;

use anyhow::Result;

use crate::models::{ConcernLevel, Nutriments, ProductReport};

/// Counts shown in every report's summary.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    /// Products with at least one personal allergy warning.
    pub with_warnings: usize,
}

impl Summary {
    pub fn of(reports: &[ProductReport]) -> Self {
        let count = |level: ConcernLevel| {
            reports
                .iter()
                .filter(|r| r.assessment.level == level)
                .count()
        };
        Summary {
            total: reports.len(),
            low: count(ConcernLevel::Low),
            moderate: count(ConcernLevel::Moderate),
            high: count(ConcernLevel::High),
            with_warnings: reports
                .iter()
                .filter(|r| !r.warnings.warnings.is_empty())
                .count(),
        }
    }
}

/// Nutrition table rows: label, nutriment key, unit.
pub(crate) const NUTRITION_ROWS: &[(&str, &str, &str)] = &[
    ("Energy", Nutriments::ENERGY_KCAL, "kcal"),
    ("Fat", Nutriments::FAT, "g"),
    ("  of which saturated", Nutriments::SATURATED_FAT, "g"),
    ("Carbohydrates", Nutriments::CARBOHYDRATES, "g"),
    ("  of which sugars", Nutriments::SUGARS, "g"),
    ("Fiber", Nutriments::FIBER, "g"),
    ("Proteins", Nutriments::PROTEINS, "g"),
    ("Salt", Nutriments::SALT, "g"),
];

/// `"N/A"` for an unknown amount, else one decimal with its unit.
pub(crate) fn format_amount(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if unit == "kcal" => format!("{:.0} {}", v, unit),
        Some(v) => format!("{:.1} {}", v, unit),
        None => "N/A".to_string(),
    }
}

pub fn render_json(reports: &[ProductReport]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        PersonalWarning, Product, ProfileStatus, WarningOutcome, WarningSeverity,
    };
    use crate::scoring::concern::calculate_concern;

    fn report(product: Product, warnings: WarningOutcome) -> ProductReport {
        ProductReport {
            origin: "test".to_string(),
            assessment: calculate_concern(&product),
            product,
            health_score: None,
            warnings,
            alerts: Vec::new(),
            insight: None,
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(None, "g"), "N/A");
        assert_eq!(format_amount(Some(0.0), "g"), "0.0 g");
        assert_eq!(format_amount(Some(10.64), "g"), "10.6 g");
        assert_eq!(format_amount(Some(539.4), "kcal"), "539 kcal");
    }

    #[test]
    fn test_summary_counts() {
        let clean = Product::default();
        let junk = Product {
            nutriscore_grade: crate::models::NutriscoreGrade::E,
            additives: (0..6).map(|i| format!("en:e{}", 100 + i)).collect(),
            ingredients_text: "sugar, palm oil".to_string(),
            ..Product::default()
        };
        let warned = WarningOutcome {
            status: ProfileStatus::Checked,
            warnings: vec![PersonalWarning {
                allergen_token: "milk".to_string(),
                matched_text: "Contains milk".to_string(),
                severity: WarningSeverity::High,
            }],
        };

        let reports = vec![
            report(clean.clone(), WarningOutcome::no_profile_data()),
            report(clean, warned),
            report(junk, WarningOutcome::no_profile_data()),
        ];

        assert_eq!(
            Summary::of(&reports),
            Summary {
                total: 3,
                low: 2,
                moderate: 0,
                high: 1,
                with_warnings: 1,
            }
        );
        assert!(reports[1].needs_attention());
        assert!(reports[2].needs_attention());
        assert!(!reports[0].needs_attention());
    }

    #[test]
    fn test_json_uses_camel_case() {
        let r = report(Product::default(), WarningOutcome::no_profile_data());
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["assessment"]["level"], "low");
        assert!(value["assessment"].get("firedRules").is_some());
        assert!(value.get("healthScore").is_some());
        assert_eq!(value["warnings"]["status"], "no_profile_data");
    }
}
