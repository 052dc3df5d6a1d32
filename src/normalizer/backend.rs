use serde_json::Value;

use crate::models::{NutriscoreGrade, Product, UNKNOWN_SOURCE};

use super::{nutriments, text, text_list};

/// Normalizer for the local backend's flattened product shape.
///
/// The backend has gone through several revisions, so every field is looked
/// up under each of its historical names.
pub struct BackendNormalizer;

impl BackendNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl super::Normalizer for BackendNormalizer {
    fn normalize(&self, raw: &Value) -> Product {
        let defaults = Product::default();

        let ingredients_text = match raw.get("ingredients") {
            Some(Value::String(_)) => text(raw, &["ingredients_text", "ingredients"]),
            _ => text(raw, &["ingredients_text"]),
        };

        let ingredients_list = match (raw.get("parsed_ingredients"), raw.get("ingredients")) {
            (Some(parsed @ Value::Array(_)), _) => text_list(Some(parsed)),
            (_, Some(structured @ Value::Array(_))) => text_list(Some(structured)),
            _ => Vec::new(),
        };

        // A list of allergens is structured risk data; a plain string is a
        // free-text declaration.
        let (allergens_text, allergen_risks) = match raw.get("allergens") {
            Some(list @ Value::Array(_)) => {
                let entries = text_list(Some(list));
                (entries.join(", "), entries)
            }
            _ => (text(raw, &["allergens", "allergens_text"]).unwrap_or_default(), Vec::new()),
        };

        let nutrient_map = raw.get("nutriments").or_else(|| raw.get("nutrients"));

        Product {
            name: text(raw, &["name", "product_name"]).unwrap_or(defaults.name),
            brand: text(raw, &["brand", "brands"]).unwrap_or(defaults.brand),
            ingredients_text: ingredients_text.unwrap_or(defaults.ingredients_text),
            ingredients_list,
            nutriments: nutriments(nutrient_map),
            nutriscore_grade: text(
                raw,
                &["nutriscore_grade", "nutri_score", "nutriscore", "nutrition_grades"],
            )
            .map(|g| NutriscoreGrade::parse(&g))
            .unwrap_or(NutriscoreGrade::Unknown),
            additives: text_list(raw.get("additives")),
            allergens_text,
            allergen_risks,
            image_url: text(raw, &["image_url", "image"]).unwrap_or_default(),
            barcode: text(raw, &["barcode", "code"]).unwrap_or_default(),
            source: text(raw, &["source"]).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Normalizer;
    use super::*;
    use crate::models::Nutriments;
    use serde_json::json;

    #[test]
    fn test_normalize_backend_payload() {
        let raw = json!({
            "name": "Mock Coca-Cola",
            "brand": "Coca-Cola",
            "ingredients": "Carbonated Water, Sugar, Color (Caramel E150d), Phosphoric Acid",
            "nutrients": { "sugars_100g": 10.6, "salt_100g": 0 },
            "nutri_score": "E",
            "allergens": [],
            "additives": ["E150d", "E338"],
            "image": null,
            "source": "Open Food Facts",
            "barcode": "5449000000996"
        });
        let p = BackendNormalizer::new().normalize(&raw);
        assert_eq!(p.name, "Mock Coca-Cola");
        assert_eq!(p.ingredients_text, "Carbonated Water, Sugar, Color (Caramel E150d), Phosphoric Acid");
        assert!(p.ingredients_list.is_empty());
        assert_eq!(p.nutriscore_grade, NutriscoreGrade::E);
        assert_eq!(p.nutriments.get(Nutriments::SALT), Some(0.0));
        assert_eq!(p.additives, vec!["E150d", "E338"]);
        assert!(p.allergens_text.is_empty());
        assert_eq!(p.image_url, "");
        assert_eq!(p.barcode, "5449000000996");
    }

    #[test]
    fn test_parsed_ingredients_and_allergen_list() {
        let raw = json!({
            "name": "Granola",
            "ingredients_text": "oats, honey, almonds",
            "parsed_ingredients": ["oats", "", "honey", { "text": "almonds" }],
            "allergens": ["Contains almonds", "May contain peanuts"]
        });
        let p = BackendNormalizer::new().normalize(&raw);
        assert_eq!(p.ingredients_list, vec!["oats", "honey", "almonds"]);
        assert_eq!(p.allergen_risks.len(), 2);
        assert_eq!(p.allergens_text, "Contains almonds, May contain peanuts");
    }

    #[test]
    fn test_empty_object_is_all_defaults() {
        assert_eq!(BackendNormalizer::new().normalize(&json!({})), Product::default());
    }
}
