use crate::models::Nutriments;

const BASE_SCORE: f64 = 70.0;

/// Rough nutrient-based health score in `0..=100`, higher is healthier.
///
/// Penalizes sugars, saturated fat and salt, rewards fiber and protein.
/// Unknown nutrients contribute nothing. Returns `None` when no nutrient
/// values are known at all.
pub fn health_score(nutriments: &Nutriments) -> Option<u8> {
    if nutriments.is_empty() {
        return None;
    }

    let value = |key: &str| nutriments.get(key).unwrap_or(0.0);

    let score = BASE_SCORE
        - value(Nutriments::SUGARS)
        - value(Nutriments::SATURATED_FAT) * 2.0
        - value(Nutriments::SALT) * 10.0
        + value(Nutriments::FIBER) * 2.0
        + value(Nutriments::PROTEINS);

    Some(score.clamp(0.0, 100.0).round() as u8)
}
