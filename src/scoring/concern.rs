use crate::models::{ConcernAssessment, ConcernLevel, FiredRule, Product};
use crate::scoring::rules::RuleTable;

const START_SCORE: i64 = 100;
const LOW_CONCERN_MIN: u8 = 80;
const MODERATE_CONCERN_MIN: u8 = 50;

/// Score a product against the default rule table.
pub fn calculate_concern(product: &Product) -> ConcernAssessment {
    assess(product, &RuleTable::default())
}

/// Score a product against `table`.
///
/// Starts at 100, subtracts the penalty of every rule that applies and
/// clamps the result to `0..=100`. Pure and deterministic.
pub fn assess(product: &Product, table: &RuleTable) -> ConcernAssessment {
    let fired_rules: Vec<FiredRule> = table
        .matching(product)
        .map(|rule| FiredRule {
            id: rule.id.clone(),
            penalty: rule.penalty,
        })
        .collect();

    let total_penalty: i64 = fired_rules.iter().map(|r| i64::from(r.penalty)).sum();
    let score = (START_SCORE - total_penalty).clamp(0, 100) as u8;
    let level = level_for(score);

    ConcernAssessment {
        score,
        level,
        label: label(level).to_string(),
        explanation: explanation(level).to_string(),
        fired_rules,
    }
}

/// `>= 80` low, `50..80` moderate, below 50 high.
pub fn level_for(score: u8) -> ConcernLevel {
    if score >= LOW_CONCERN_MIN {
        ConcernLevel::Low
    } else if score >= MODERATE_CONCERN_MIN {
        ConcernLevel::Moderate
    } else {
        ConcernLevel::High
    }
}

pub fn label(level: ConcernLevel) -> &'static str {
    match level {
        ConcernLevel::Low => "Low Concern",
        ConcernLevel::Moderate => "Moderate Concern",
        ConcernLevel::High => "High Concern",
    }
}

fn explanation(level: ConcernLevel) -> &'static str {
    match level {
        ConcernLevel::Low => {
            "No significant concern indicators were found. The product has a good or \
             unknown nutrition grade, few additives and no palm oil."
        }
        ConcernLevel::Moderate => {
            "Some concern indicators were found. Check the nutrition grade, additive \
             count and ingredient list before making this a regular choice."
        }
        ConcernLevel::High => {
            "Several concern indicators were found, such as a poor nutrition grade, \
             many additives or palm oil. Consider limiting consumption."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutriscoreGrade;
    use crate::scoring::rules::{ConcernRule, RuleKind};

    fn product(grade: NutriscoreGrade, additives: usize, ingredients: &str) -> Product {
        Product {
            nutriscore_grade: grade,
            additives: (0..additives).map(|i| format!("en:e{}", 100 + i)).collect(),
            ingredients_text: ingredients.to_string(),
            ..Product::default()
        }
    }

    #[test]
    fn test_clean_products_score_100() {
        for grade in [NutriscoreGrade::A, NutriscoreGrade::B, NutriscoreGrade::Unknown] {
            for additives in 0..=5 {
                let a = calculate_concern(&product(grade, additives, "oats, honey"));
                assert_eq!(a.score, 100);
                assert_eq!(a.level, ConcernLevel::Low);
                assert!(a.fired_rules.is_empty());
            }
        }
    }

    #[test]
    fn test_all_penalties_together() {
        let a = calculate_concern(&product(NutriscoreGrade::E, 6, "Sugar, Palm Oil, cocoa"));
        assert_eq!(a.score, 30);
        assert_eq!(a.level, ConcernLevel::High);
        assert_eq!(a.label, "High Concern");
        let ids: Vec<&str> = a.fired_rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["nutriscore-e", "additives", "ingredient-palm-oil"]);
    }

    #[test]
    fn test_grade_d_is_moderate() {
        let a = calculate_concern(&product(NutriscoreGrade::D, 0, "water"));
        assert_eq!(a.score, 75);
        assert_eq!(a.level, ConcernLevel::Moderate);
        assert_eq!(a.label, "Moderate Concern");
    }

    #[test]
    fn test_grade_c_is_low() {
        let a = calculate_concern(&product(NutriscoreGrade::C, 0, "water"));
        assert_eq!(a.score, 90);
        assert_eq!(a.level, ConcernLevel::Low);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for(80), ConcernLevel::Low);
        assert_eq!(level_for(79), ConcernLevel::Moderate);
        assert_eq!(level_for(50), ConcernLevel::Moderate);
        assert_eq!(level_for(49), ConcernLevel::High);
        assert_eq!(level_for(0), ConcernLevel::High);
    }

    #[test]
    fn test_score_is_clamped_at_zero() {
        let mut table = RuleTable::default();
        table.push(ConcernRule::new("huge", RuleKind::AdditiveCountAbove(0), 500));
        let a = assess(&product(NutriscoreGrade::E, 6, "palm oil"), &table);
        assert_eq!(a.score, 0);
        assert_eq!(a.level, ConcernLevel::High);
    }

    #[test]
    fn test_score_always_in_range() {
        let grades = [
            NutriscoreGrade::A,
            NutriscoreGrade::B,
            NutriscoreGrade::C,
            NutriscoreGrade::D,
            NutriscoreGrade::E,
            NutriscoreGrade::Unknown,
        ];
        for grade in grades {
            for additives in [0, 5, 6, 40] {
                for text in ["", "palm oil", "Not Available"] {
                    let a = calculate_concern(&product(grade, additives, text));
                    assert!(a.score <= 100);
                    assert_eq!(a.level, level_for(a.score));
                }
            }
        }
    }

    #[test]
    fn test_same_product_same_assessment() {
        let p = product(NutriscoreGrade::D, 7, "palm oil");
        assert_eq!(calculate_concern(&p), calculate_concern(&p));
    }

    #[test]
    fn test_empty_defaults_do_not_fire() {
        let a = calculate_concern(&Product::default());
        assert_eq!(a.score, 100);
    }
}
