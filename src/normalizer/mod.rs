//! Conversion of weakly-typed upstream payloads into the canonical [`Product`].
//!
//! Each upstream shape has its own [`Normalizer`]; [`normalize`] detects the
//! shape and dispatches. All normalizers are total: missing, `null` or
//! mistyped fields fall back to the [`Product::default`] values.

use serde_json::Value;

use crate::detector::{detect_source, unwrap_envelope};
use crate::models::{Nutriments, PayloadSource, Product};

pub mod backend;
pub mod canonical;
pub mod open_food_facts;
pub mod usda;

pub trait Normalizer {
    fn normalize(&self, raw: &Value) -> Product;
}

/// Normalize any recognized payload shape into a [`Product`].
pub fn normalize(raw: &Value) -> Product {
    normalize_as(detect_source(raw), raw)
}

/// Normalize a payload whose shape is already known, e.g. a lookup response.
pub fn normalize_as(source: PayloadSource, raw: &Value) -> Product {
    tracing::debug!(%source, "normalizing product payload");

    match source {
        PayloadSource::OpenFoodFacts => {
            let inner = unwrap_envelope(raw).unwrap_or(raw);
            open_food_facts::OpenFoodFactsNormalizer::new().normalize(inner)
        }
        PayloadSource::Backend => backend::BackendNormalizer::new().normalize(raw),
        PayloadSource::Usda => usda::UsdaNormalizer::new().normalize(raw),
        PayloadSource::Canonical => canonical::CanonicalNormalizer::new().normalize(raw),
    }
}

/// First non-blank string (or number, rendered) found under any of `keys`.
pub(crate) fn text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Text of a list-shaped field.
///
/// Accepts an array of strings, an array of objects carrying a `text` (or
/// `name`) sub-field, or a comma-separated string. Blank entries are dropped.
pub(crate) fn text_list(value: Option<&Value>) -> Vec<String> {
    let entries: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => text(item, &["text", "name"]),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// A number, or a string holding one (Open Food Facts mixes both).
pub(crate) fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Keep every numeric entry of a nutriment object; everything else is unknown.
pub(crate) fn nutriments(value: Option<&Value>) -> Nutriments {
    let mut out = Nutriments::new();
    if let Some(map) = value.and_then(Value::as_object) {
        for (key, v) in map {
            if let Some(n) = number(v) {
                out.insert(key.clone(), n);
            }
        }
    }
    out
}

/// Human label for a taxonomy tag: `en:soy-lecithin` → `soy lecithin`.
pub(crate) fn tag_label(tag: &str) -> String {
    let bare = match tag.split_once(':') {
        Some((lang, rest)) if lang.len() <= 3 => rest,
        _ => tag,
    };
    bare.replace('-', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_skips_blank_and_null() {
        let raw = json!({ "a": "  ", "b": null, "c": " Oreo " });
        assert_eq!(text(&raw, &["a", "b", "c"]), Some("Oreo".to_string()));
        assert_eq!(text(&raw, &["missing"]), None);
    }

    #[test]
    fn test_text_list_shapes() {
        let structured = json!([{ "text": "Sugar" }, { "text": "" }, { "id": "en:x" }, "Salt"]);
        assert_eq!(text_list(Some(&structured)), vec!["Sugar", "Salt"]);

        let flat = json!("water, sugar, ,salt");
        assert_eq!(text_list(Some(&flat)), vec!["water", "sugar", "salt"]);

        assert!(text_list(Some(&json!(42))).is_empty());
        assert!(text_list(None).is_empty());
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        assert_eq!(number(&json!(10.6)), Some(10.6));
        assert_eq!(number(&json!("0.5")), Some(0.5));
        assert_eq!(number(&json!("kcal")), None);
        assert_eq!(number(&json!(null)), None);
    }

    #[test]
    fn test_nutriments_keep_zero_and_drop_junk() {
        let n = nutriments(Some(&json!({
            "salt_100g": 0,
            "sugars_100g": "10.6",
            "energy_unit": "kcal",
            "fat_100g": null
        })));
        assert_eq!(n.get(Nutriments::SALT), Some(0.0));
        assert_eq!(n.get(Nutriments::SUGARS), Some(10.6));
        assert_eq!(n.get(Nutriments::FAT), None);
        assert_eq!(n.len(), 2);
    }

    #[test]
    fn test_tag_label() {
        assert_eq!(tag_label("en:soy-lecithin"), "soy lecithin");
        assert_eq!(tag_label("milk"), "milk");
    }

    #[test]
    fn test_normalize_non_object_yields_defaults() {
        assert_eq!(normalize(&json!(null)), Product::default());
        assert_eq!(normalize(&json!("garbage")), Product::default());
    }

    #[test]
    fn test_normalize_as_overrides_detection() {
        // `product_name` alone would be detected as Open Food Facts.
        let raw = json!({"product_name": "Oat Bar", "source": "Local DB"});
        assert_eq!(detect_source(&raw), PayloadSource::OpenFoodFacts);
        let product = normalize_as(PayloadSource::Backend, &raw);
        assert_eq!(product.name, "Oat Bar");
        assert_eq!(product.source, "Local DB");
    }
}
