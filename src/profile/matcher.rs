use crate::models::{
    HealthProfile, PersonalWarning, Product, ProfileStatus, WarningOutcome, WarningSeverity,
};

/// Cross-reference a profile's declared allergies with a product's
/// allergen-risk text.
///
/// Returns [`ProfileStatus::NoProfileData`] when the profile declares nothing
/// (empty, or only `none`), so callers can prompt for a profile instead of
/// reporting "no conflicts". A `none` mixed with real tokens is ignored.
///
/// Matching is a case-insensitive substring test of every term against every
/// risk entry; each hit is one warning. An entry that says "contains" is
/// treated as a declared ingredient (high severity), anything else as a
/// possible trace (moderate).
pub fn match_warnings(product: &Product, profile: &HealthProfile) -> WarningOutcome {
    if !profile.has_declared_allergies() {
        return WarningOutcome::no_profile_data();
    }

    let risk_texts = product.allergen_risk_texts();
    let mut warnings = Vec::new();

    for term in profile.match_terms() {
        for text in &risk_texts {
            if text.to_lowercase().contains(&term) {
                warnings.push(PersonalWarning {
                    allergen_token: term.clone(),
                    matched_text: text.to_string(),
                    severity: severity_of(text),
                });
            }
        }
    }

    tracing::debug!(
        product = %product.name,
        warnings = warnings.len(),
        "checked allergens against profile"
    );

    WarningOutcome {
        status: ProfileStatus::Checked,
        warnings,
    }
}

/// `High` when the text contains the word "contains", else `Moderate`.
fn severity_of(text: &str) -> WarningSeverity {
    let declares = text
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case("contains"));
    if declares {
        WarningSeverity::High
    } else {
        WarningSeverity::Moderate
    }
}
