use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const UNKNOWN_BRAND: &str = "Unknown Brand";
pub const INGREDIENTS_NOT_AVAILABLE: &str = "Not Available";
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Canonical product record produced by the normalizer.
///
/// Every field is always populated; absence in the upstream payload is
/// expressed through the documented defaults (see [`Product::default`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub brand: String,
    pub ingredients_text: String,
    /// Parsed ingredient names. Empty means "display `ingredients_text` instead".
    pub ingredients_list: Vec<String>,
    pub nutriments: Nutriments,
    pub nutriscore_grade: NutriscoreGrade,
    /// Additive tag identifiers as supplied upstream (e.g. `en:e330`).
    pub additives: Vec<String>,
    pub allergens_text: String,
    /// Structured allergen-risk entries (e.g. `Contains milk`,
    /// `May contain traces of nuts`).
    pub allergen_risks: Vec<String>,
    pub image_url: String,
    pub barcode: String,
    pub source: String,
}

impl Default for Product {
    fn default() -> Self {
        Product {
            name: UNKNOWN_PRODUCT.to_string(),
            brand: UNKNOWN_BRAND.to_string(),
            ingredients_text: INGREDIENTS_NOT_AVAILABLE.to_string(),
            ingredients_list: Vec::new(),
            nutriments: Nutriments::default(),
            nutriscore_grade: NutriscoreGrade::Unknown,
            additives: Vec::new(),
            allergens_text: String::new(),
            allergen_risks: Vec::new(),
            image_url: String::new(),
            barcode: String::new(),
            source: UNKNOWN_SOURCE.to_string(),
        }
    }
}

impl Product {
    /// The allergen-risk text collection matched against a health profile.
    ///
    /// The structured list wins when present; otherwise the free-text
    /// allergen declaration is used as a single entry.
    pub fn allergen_risk_texts(&self) -> Vec<&str> {
        if !self.allergen_risks.is_empty() {
            return self.allergen_risks.iter().map(String::as_str).collect();
        }
        let text = self.allergens_text.trim();
        if text.is_empty() {
            Vec::new()
        } else {
            vec![text]
        }
    }

    /// Ingredient names for display, falling back to the raw text.
    pub fn display_ingredients(&self) -> Vec<&str> {
        if self.ingredients_list.is_empty() {
            vec![self.ingredients_text.as_str()]
        } else {
            self.ingredients_list.iter().map(String::as_str).collect()
        }
    }
}

/// Per-100g nutrient values keyed by upstream nutrient name.
///
/// A key that is not present means "unknown"; `0.0` is a measured value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nutriments(BTreeMap<String, f64>);

impl Nutriments {
    pub const ENERGY_KCAL: &'static str = "energy-kcal_100g";
    pub const SUGARS: &'static str = "sugars_100g";
    pub const FAT: &'static str = "fat_100g";
    pub const SATURATED_FAT: &'static str = "saturated-fat_100g";
    pub const SALT: &'static str = "salt_100g";
    pub const FIBER: &'static str = "fiber_100g";
    pub const PROTEINS: &'static str = "proteins_100g";
    pub const CARBOHYDRATES: &'static str = "carbohydrates_100g";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value. Non-finite numbers are dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        if value.is_finite() {
            self.0.insert(key.into(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Nutri-Score letter grade, `Unknown` when upstream does not provide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutriscoreGrade {
    A,
    B,
    C,
    D,
    E,
    Unknown,
}

impl NutriscoreGrade {
    /// Parse a grade leniently (`"E"`, `" d "`, `"c"`); anything else is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => NutriscoreGrade::A,
            "b" => NutriscoreGrade::B,
            "c" => NutriscoreGrade::C,
            "d" => NutriscoreGrade::D,
            "e" => NutriscoreGrade::E,
            _ => NutriscoreGrade::Unknown,
        }
    }
}

impl std::fmt::Display for NutriscoreGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NutriscoreGrade::A => write!(f, "a"),
            NutriscoreGrade::B => write!(f, "b"),
            NutriscoreGrade::C => write!(f, "c"),
            NutriscoreGrade::D => write!(f, "d"),
            NutriscoreGrade::E => write!(f, "e"),
            NutriscoreGrade::Unknown => write!(f, "unknown"),
        }
    }
}

/// User-owned health profile, read-only from the engines' point of view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthProfile {
    pub allergies: BTreeSet<String>,
    /// Free-text detail for the `other` allergy token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_allergy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivities: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcernLevel {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for ConcernLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConcernLevel::Low => write!(f, "low"),
            ConcernLevel::Moderate => write!(f, "moderate"),
            ConcernLevel::High => write!(f, "high"),
        }
    }
}

/// A scoring rule that fired, kept so the score can be audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredRule {
    pub id: String,
    pub penalty: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcernAssessment {
    pub score: u8,
    pub level: ConcernLevel,
    pub label: String,
    pub explanation: String,
    pub fired_rules: Vec<FiredRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    High,
    Moderate,
}

impl std::fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningSeverity::High => write!(f, "high"),
            WarningSeverity::Moderate => write!(f, "moderate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalWarning {
    pub allergen_token: String,
    pub matched_text: String,
    pub severity: WarningSeverity,
}

/// Whether a profile carried anything to check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    /// No allergies declared (empty, or only `none`): prompt the user to
    /// complete their profile.
    NoProfileData,
    /// Allergies were declared and the product was checked.
    Checked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningOutcome {
    pub status: ProfileStatus,
    pub warnings: Vec<PersonalWarning>,
}

impl WarningOutcome {
    pub fn no_profile_data() -> Self {
        WarningOutcome {
            status: ProfileStatus::NoProfileData,
            warnings: Vec::new(),
        }
    }

    pub fn has_high_severity(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::High)
    }
}

/// An ingredient banned or restricted in at least one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryAlert {
    pub ingredient: String,
    pub banned_in: Vec<String>,
}

/// Everything computed for one looked-up product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReport {
    /// Where the payload came from (file path, barcode, search query).
    pub origin: String,
    pub product: Product,
    pub assessment: ConcernAssessment,
    pub health_score: Option<u8>,
    pub warnings: WarningOutcome,
    pub alerts: Vec<RegulatoryAlert>,
    pub insight: Option<String>,
}

impl ProductReport {
    /// True when the product should fail the run.
    pub fn needs_attention(&self) -> bool {
        self.assessment.level == ConcernLevel::High || self.warnings.has_high_severity()
    }
}

/// Upstream payload shapes the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadSource {
    OpenFoodFacts,
    Backend,
    Usda,
    Canonical,
}

impl std::fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadSource::OpenFoodFacts => write!(f, "Open Food Facts"),
            PayloadSource::Backend => write!(f, "Backend"),
            PayloadSource::Usda => write!(f, "USDA FoodData Central"),
            PayloadSource::Canonical => write!(f, "Canonical"),
        }
    }
}
