use regex::Regex;

use crate::config::RegulatoryConfig;
use crate::models::{Product, RegulatoryAlert};

/// Flag ingredients that are banned or restricted in some jurisdictions.
///
/// Searches the ingredient text and the structured ingredient list,
/// case-insensitively. Names are matched on word boundaries so that short
/// acronyms such as `BHA` do not fire inside unrelated words.
pub fn check_banned(product: &Product, config: &RegulatoryConfig) -> Vec<RegulatoryAlert> {
    let haystack = ingredient_haystack(product);
    if haystack.is_empty() {
        return Vec::new();
    }

    let mut alerts = Vec::new();
    for (ingredient, regions) in &config.banned {
        let Some(pattern) = word_pattern(ingredient) else {
            tracing::warn!(ingredient = %ingredient, "skipping unusable banned-ingredient entry");
            continue;
        };
        if pattern.is_match(&haystack) {
            alerts.push(RegulatoryAlert {
                ingredient: ingredient.clone(),
                banned_in: regions.clone(),
            });
        }
    }
    alerts
}

fn ingredient_haystack(product: &Product) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(product.ingredients_list.len() + 1);
    if !product.ingredients_text.trim().is_empty() {
        parts.push(&product.ingredients_text);
    }
    parts.extend(product.ingredients_list.iter().map(String::as_str));
    parts.join("\n")
}

fn word_pattern(name: &str) -> Option<Regex> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(text: &str, list: &[&str]) -> Product {
        Product {
            ingredients_text: text.to_string(),
            ingredients_list: list.iter().map(|s| s.to_string()).collect(),
            ..Product::default()
        }
    }

    #[test]
    fn test_flags_banned_ingredient_in_text() {
        let p = product("Enriched flour, water, potassium bromate, salt", &[]);
        let alerts = check_banned(&p, &RegulatoryConfig::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].ingredient, "Potassium Bromate");
        assert!(alerts[0].banned_in.contains(&"Canada".to_string()));
    }

    #[test]
    fn test_flags_from_ingredient_list() {
        let p = product("", &["sugar", "Titanium dioxide", "BHT"]);
        let names: Vec<String> = check_banned(&p, &RegulatoryConfig::default())
            .into_iter()
            .map(|a| a.ingredient)
            .collect();
        assert_eq!(names, vec!["BHT", "Titanium Dioxide"]);
    }

    #[test]
    fn test_acronyms_need_word_boundaries() {
        // "bhakri" and "abbvo" must not trip BHA / BVO
        let p = product("bhakri flour, abbvo extract", &[]);
        assert!(check_banned(&p, &RegulatoryConfig::default()).is_empty());

        let p = product("Soybean oil (preserved with BHA)", &[]);
        let alerts = check_banned(&p, &RegulatoryConfig::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].ingredient, "BHA");
    }

    #[test]
    fn test_clean_or_missing_ingredients() {
        let cfg = RegulatoryConfig::default();
        assert!(check_banned(&product("water, sugar, lemon juice", &[]), &cfg).is_empty());
        assert!(check_banned(&Product::default(), &cfg).is_empty());
    }

    #[test]
    fn test_custom_list_from_config() {
        let mut cfg = RegulatoryConfig::default();
        cfg.banned.clear();
        cfg.banned
            .insert("Red 3".to_string(), vec!["California".to_string()]);
        let alerts = check_banned(&product("sugar, RED 3, corn syrup", &[]), &cfg);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].banned_in, vec!["California"]);
    }
}
