use serde_json::Value;

use crate::models::{NutriscoreGrade, Nutriments, PayloadSource, Product};

use super::{number, text};

/// Salt is reported by USDA as sodium; salt ≈ sodium × 2.5.
const SODIUM_TO_SALT: f64 = 2.5;

pub struct UsdaNormalizer;

impl UsdaNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl super::Normalizer for UsdaNormalizer {
    fn normalize(&self, raw: &Value) -> Product {
        let defaults = Product::default();

        Product {
            name: text(raw, &["description", "lowercaseDescription"]).unwrap_or(defaults.name),
            brand: text(raw, &["brandOwner", "brandName"]).unwrap_or(defaults.brand),
            ingredients_text: text(raw, &["ingredients"]).unwrap_or(defaults.ingredients_text),
            ingredients_list: Vec::new(),
            nutriments: food_nutrients(raw.get("foodNutrients")),
            // USDA has no Nutri-Score.
            nutriscore_grade: NutriscoreGrade::Unknown,
            additives: Vec::new(),
            allergens_text: String::new(),
            allergen_risks: Vec::new(),
            image_url: String::new(),
            barcode: text(raw, &["gtinUpc"]).unwrap_or_default(),
            source: PayloadSource::Usda.to_string(),
        }
    }
}

/// Map USDA `foodNutrients` entries onto the per-100g keys used everywhere else.
///
/// Handles both the search shape (`nutrientName`/`value`/`unitName`) and the
/// detail shape (`nutrient.name`/`amount`/`nutrient.unitName`). The first
/// entry for a key wins.
fn food_nutrients(value: Option<&Value>) -> Nutriments {
    let mut out = Nutriments::new();
    let Some(entries) = value.and_then(Value::as_array) else {
        return out;
    };

    for entry in entries {
        let nutrient = entry.get("nutrient").unwrap_or(entry);
        let name = text(nutrient, &["name"])
            .or_else(|| text(entry, &["nutrientName"]))
            .unwrap_or_default()
            .to_lowercase();
        let unit = text(nutrient, &["unitName"])
            .or_else(|| text(entry, &["unitName"]))
            .unwrap_or_default()
            .to_lowercase();
        let Some(amount) = entry
            .get("value")
            .or_else(|| entry.get("amount"))
            .and_then(number)
        else {
            continue;
        };

        let (key, amount) = if name.contains("energy") {
            if unit != "kcal" && !name.contains("kcal") {
                continue;
            }
            (Nutriments::ENERGY_KCAL, amount)
        } else if name.contains("sugars") {
            (Nutriments::SUGARS, amount)
        } else if name.contains("saturated") {
            (Nutriments::SATURATED_FAT, amount)
        } else if name.contains("total lipid") || name == "fat" {
            (Nutriments::FAT, amount)
        } else if name.contains("fiber") {
            (Nutriments::FIBER, amount)
        } else if name.contains("protein") {
            (Nutriments::PROTEINS, amount)
        } else if name.contains("carbohydrate") {
            (Nutriments::CARBOHYDRATES, amount)
        } else if name.contains("sodium") {
            let grams = if unit == "g" { amount } else { amount / 1000.0 };
            (Nutriments::SALT, grams * SODIUM_TO_SALT)
        } else {
            continue;
        };

        if out.get(key).is_none() {
            out.insert(key, amount);
        }
    }

    out
}
