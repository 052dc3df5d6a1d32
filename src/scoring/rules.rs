use crate::config::ScoringConfig;
use crate::models::{NutriscoreGrade, Product};

/// What a rule looks at.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Fires when the product carries exactly this Nutri-Score grade.
    Grade(NutriscoreGrade),
    /// Fires when the product lists strictly more additives than the limit.
    AdditiveCountAbove(usize),
    /// Fires when the ingredient text mentions this phrase (case-insensitive).
    IngredientMention(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcernRule {
    pub id: String,
    pub kind: RuleKind,
    pub penalty: u32,
}

impl ConcernRule {
    pub fn new(id: impl Into<String>, kind: RuleKind, penalty: u32) -> Self {
        ConcernRule {
            id: id.into(),
            kind,
            penalty,
        }
    }

    pub fn applies(&self, product: &Product) -> bool {
        match &self.kind {
            RuleKind::Grade(grade) => product.nutriscore_grade == *grade,
            RuleKind::AdditiveCountAbove(limit) => product.additives.len() > *limit,
            RuleKind::IngredientMention(needle) => {
                let needle = needle.trim().to_lowercase();
                !needle.is_empty() && product.ingredients_text.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Ordered list of penalty rules. Every rule that applies subtracts its
/// penalty; order only affects the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: Vec<ConcernRule>,
}

impl RuleTable {
    pub fn empty() -> Self {
        RuleTable { rules: Vec::new() }
    }

    /// Build the table from `[scoring]` configuration.
    ///
    /// Grade keys that are not `a`–`e` are skipped with a warning; `unknown`
    /// never carries a penalty.
    pub fn from_config(config: &ScoringConfig) -> Self {
        let mut table = RuleTable::empty();

        for (key, penalty) in &config.grade_penalties {
            match NutriscoreGrade::parse(key) {
                NutriscoreGrade::Unknown => {
                    tracing::warn!(grade = %key, "ignoring penalty for unrecognized nutriscore grade");
                }
                grade => table.push(ConcernRule::new(
                    format!("nutriscore-{}", grade),
                    RuleKind::Grade(grade),
                    *penalty,
                )),
            }
        }

        table.push(ConcernRule::new(
            "additives",
            RuleKind::AdditiveCountAbove(config.additive_threshold),
            config.additive_penalty,
        ));

        for (phrase, penalty) in &config.ingredient_penalties {
            table.push(ConcernRule::new(
                format!("ingredient-{}", phrase.trim().to_lowercase().replace(' ', "-")),
                RuleKind::IngredientMention(phrase.clone()),
                *penalty,
            ));
        }

        table
    }

    pub fn push(&mut self, rule: ConcernRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[ConcernRule] {
        &self.rules
    }

    /// Rules that fire for `product`, in table order.
    pub fn matching<'a>(&'a self, product: &'a Product) -> impl Iterator<Item = &'a ConcernRule> + 'a {
        self.rules.iter().filter(move |r| r.applies(product))
    }
}

impl Default for RuleTable {
    /// Grade e −40, d −25, c −10; more than five additives −20; palm oil −10.
    fn default() -> Self {
        RuleTable::from_config(&ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_grade(grade: NutriscoreGrade) -> Product {
        Product {
            nutriscore_grade: grade,
            ..Product::default()
        }
    }

    #[test]
    fn test_default_table_contents() {
        let table = RuleTable::default();
        let ids: Vec<&str> = table.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["nutriscore-c", "nutriscore-d", "nutriscore-e", "additives", "ingredient-palm-oil"]
        );
        let penalties: Vec<u32> = table.rules().iter().map(|r| r.penalty).collect();
        assert_eq!(penalties, vec![10, 25, 40, 20, 10]);
    }

    #[test]
    fn test_grade_rule_in_isolation() {
        let rule = ConcernRule::new("e", RuleKind::Grade(NutriscoreGrade::E), 40);
        assert!(rule.applies(&product_with_grade(NutriscoreGrade::E)));
        assert!(!rule.applies(&product_with_grade(NutriscoreGrade::D)));
        assert!(!rule.applies(&product_with_grade(NutriscoreGrade::Unknown)));
    }

    #[test]
    fn test_additive_rule_is_strictly_above() {
        let rule = ConcernRule::new("additives", RuleKind::AdditiveCountAbove(5), 20);
        let mut p = Product {
            additives: vec!["en:e100".to_string(); 5],
            ..Product::default()
        };
        assert!(!rule.applies(&p));
        p.additives.push("en:e101".to_string());
        assert!(rule.applies(&p));
    }

    #[test]
    fn test_mention_rule_is_case_insensitive() {
        let rule = ConcernRule::new("palm", RuleKind::IngredientMention("palm oil".to_string()), 10);
        let p = Product {
            ingredients_text: "Sugar, PALM OIL, cocoa".to_string(),
            ..Product::default()
        };
        assert!(rule.applies(&p));
        assert!(!rule.applies(&Product::default()));
    }

    #[test]
    fn test_blank_mention_never_fires() {
        let rule = ConcernRule::new("blank", RuleKind::IngredientMention("  ".to_string()), 10);
        assert!(!rule.applies(&Product::default()));
    }

    #[test]
    fn test_unknown_grade_key_is_skipped() {
        let mut config = ScoringConfig::default();
        config.grade_penalties.insert("unknown".to_string(), 15);
        config.grade_penalties.insert("z".to_string(), 15);
        let table = RuleTable::from_config(&config);
        assert!(table
            .rules()
            .iter()
            .all(|r| !matches!(r.kind, RuleKind::Grade(NutriscoreGrade::Unknown))));
        assert_eq!(table.rules().len(), 5);
    }
}
