use serde_json::Value;

use crate::models::PayloadSource;

/// Canonical keys that only a serialized [`Product`](crate::models::Product) carries.
const CANONICAL_KEYS: &[&str] = &["ingredientsText", "ingredientsList", "nutriscoreGrade"];

const USDA_KEYS: &[&str] = &["fdcId", "foodNutrients", "brandOwner", "gtinUpc"];

const OFF_KEYS: &[&str] = &[
    "product_name",
    "brands",
    "additives_tags",
    "allergens_tags",
    "nutrition_grades",
    "code",
];

/// Unwrap an Open Food Facts `{ "status": 1, "product": {...} }` envelope.
///
/// Returns the inner product object, or `None` when `raw` is not an envelope.
pub fn unwrap_envelope(raw: &Value) -> Option<&Value> {
    let product = raw.get("product")?;
    if product.is_object() && raw.get("status").is_some() {
        Some(product)
    } else {
        None
    }
}

/// Detect which upstream shape a raw payload follows by looking at its keys.
///
/// Anything unrecognized (including non-objects) is treated as the backend's
/// flattened shape, whose normalizer is the most lenient.
pub fn detect_source(raw: &Value) -> PayloadSource {
    if unwrap_envelope(raw).is_some() {
        return PayloadSource::OpenFoodFacts;
    }

    let Some(obj) = raw.as_object() else {
        return PayloadSource::Backend;
    };

    if CANONICAL_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return PayloadSource::Canonical;
    }

    if USDA_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return PayloadSource::Usda;
    }

    // OFF products carry a structured `ingredients` array; the backend
    // flattens ingredients into a string.
    if OFF_KEYS.iter().any(|k| obj.contains_key(*k))
        || obj.get("ingredients").is_some_and(Value::is_array)
    {
        return PayloadSource::OpenFoodFacts;
    }

    PayloadSource::Backend
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_off_envelope() {
        let raw = json!({ "status": 1, "code": "5449000000996", "product": { "product_name": "Coke" } });
        assert_eq!(detect_source(&raw), PayloadSource::OpenFoodFacts);
        assert_eq!(
            unwrap_envelope(&raw).and_then(|p| p.get("product_name")),
            Some(&json!("Coke"))
        );
    }

    #[test]
    fn test_detect_bare_off_product() {
        let raw = json!({ "product_name": "Nutella", "nutriscore_grade": "e" });
        assert_eq!(detect_source(&raw), PayloadSource::OpenFoodFacts);
    }

    #[test]
    fn test_detect_canonical() {
        let raw = json!({ "name": "X", "ingredientsText": "water" });
        assert_eq!(detect_source(&raw), PayloadSource::Canonical);
    }

    #[test]
    fn test_detect_usda() {
        let raw = json!({ "fdcId": 123, "description": "CHEESE PUFFS" });
        assert_eq!(detect_source(&raw), PayloadSource::Usda);
    }

    #[test]
    fn test_detect_backend_and_garbage() {
        let raw = json!({ "name": "X", "ingredients": "water, salt", "nutri_score": "B" });
        assert_eq!(detect_source(&raw), PayloadSource::Backend);
        assert_eq!(detect_source(&json!(null)), PayloadSource::Backend);
        assert_eq!(detect_source(&json!([1, 2])), PayloadSource::Backend);
    }
}
