use serde_json::Value;

use crate::models::{NutriscoreGrade, PayloadSource, Product};

use super::{nutriments, tag_label, text, text_list};

pub struct OpenFoodFactsNormalizer;

impl OpenFoodFactsNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl super::Normalizer for OpenFoodFactsNormalizer {
    fn normalize(&self, raw: &Value) -> Product {
        let defaults = Product::default();

        // OFF always ships `ingredients` as structured entries; a string here
        // is someone else's flattening and must not be split into a list.
        let ingredients_list = match raw.get("ingredients") {
            Some(v @ Value::Array(_)) => text_list(Some(v)),
            _ => Vec::new(),
        };

        let additives = text_list(raw.get("additives_tags"));

        let allergen_labels: Vec<String> = text_list(raw.get("allergens_tags"))
            .iter()
            .map(|t| tag_label(t))
            .collect();
        let trace_labels: Vec<String> = text_list(raw.get("traces_tags"))
            .iter()
            .map(|t| tag_label(t))
            .collect();

        let allergens_text = if allergen_labels.is_empty() {
            text(raw, &["allergens"])
                .map(|s| {
                    s.split(',')
                        .map(tag_label)
                        .filter(|l| !l.is_empty())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default()
        } else {
            allergen_labels.join(", ")
        };

        let allergen_risks = allergen_labels
            .iter()
            .map(|l| format!("Contains {}", l))
            .chain(trace_labels.iter().map(|l| format!("May contain traces of {}", l)))
            .collect();

        Product {
            name: text(raw, &["product_name", "product_name_en", "generic_name"])
                .unwrap_or(defaults.name),
            brand: text(raw, &["brands", "brand_owner"]).unwrap_or(defaults.brand),
            ingredients_text: text(raw, &["ingredients_text", "ingredients_text_en"])
                .unwrap_or(defaults.ingredients_text),
            ingredients_list,
            nutriments: nutriments(raw.get("nutriments")),
            nutriscore_grade: text(raw, &["nutriscore_grade", "nutrition_grades"])
                .map(|g| NutriscoreGrade::parse(&g))
                .unwrap_or(NutriscoreGrade::Unknown),
            additives,
            allergens_text,
            allergen_risks,
            image_url: text(raw, &["image_url", "image_front_url"]).unwrap_or_default(),
            barcode: text(raw, &["code", "_id"]).unwrap_or_default(),
            source: PayloadSource::OpenFoodFacts.to_string(),
        }
    }
}
