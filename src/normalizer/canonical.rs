use serde_json::Value;

use crate::models::{NutriscoreGrade, Product, UNKNOWN_SOURCE};

use super::{nutriments, text, text_list};

/// Re-normalizes a serialized [`Product`].
///
/// Reads field by field instead of deserializing so that a hand-edited or
/// partially populated record still comes back fully defaulted. For any
/// product produced by this crate the result is equal to the input.
pub struct CanonicalNormalizer;

impl CanonicalNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl super::Normalizer for CanonicalNormalizer {
    fn normalize(&self, raw: &Value) -> Product {
        let defaults = Product::default();

        Product {
            name: text(raw, &["name"]).unwrap_or(defaults.name),
            brand: text(raw, &["brand"]).unwrap_or(defaults.brand),
            ingredients_text: text(raw, &["ingredientsText"]).unwrap_or(defaults.ingredients_text),
            ingredients_list: text_list(raw.get("ingredientsList")),
            nutriments: nutriments(raw.get("nutriments")),
            nutriscore_grade: text(raw, &["nutriscoreGrade"])
                .map(|g| NutriscoreGrade::parse(&g))
                .unwrap_or(NutriscoreGrade::Unknown),
            additives: text_list(raw.get("additives")),
            allergens_text: text(raw, &["allergensText"]).unwrap_or_default(),
            allergen_risks: text_list(raw.get("allergenRisks")),
            image_url: text(raw, &["imageUrl"]).unwrap_or_default(),
            barcode: text(raw, &["barcode"]).unwrap_or_default(),
            source: text(raw, &["source"]).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        }
    }
}
