//! Health profiles: allergy vocabulary, editing rules, persistence, and
//! the allergen cross-reference in [`matcher`].

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::models::HealthProfile;

pub mod matcher;

/// Sentinel meaning "no allergies". Exclusive with every other token.
pub const NONE_TOKEN: &str = "none";
/// Escape token whose detail lives in [`HealthProfile::other_allergy`].
pub const OTHER_TOKEN: &str = "other";

/// Allergy tokens the survey offers, besides `none` and `other`.
pub const KNOWN_ALLERGENS: &[&str] = &[
    "peanuts",
    "tree nuts",
    "milk",
    "eggs",
    "soy",
    "gluten",
    "wheat",
    "fish",
    "shellfish",
    "sesame",
    "mustard",
    "celery",
    "sulphites",
];

/// Vocabulary check, ignoring case and surrounding whitespace.
pub fn is_known_token(token: &str) -> bool {
    let token = canonical_token(token);
    token == NONE_TOKEN || token == OTHER_TOKEN || KNOWN_ALLERGENS.contains(&token.as_str())
}

fn canonical_token(token: &str) -> String {
    token.trim().to_lowercase()
}

impl HealthProfile {
    /// Select an allergy, keeping `none` exclusive.
    ///
    /// Selecting `none` clears every other entry (and the `other` detail);
    /// selecting anything else removes `none`.
    pub fn select_allergy(&mut self, token: &str) {
        let token = canonical_token(token);
        if token.is_empty() {
            return;
        }
        if token == NONE_TOKEN {
            self.allergies.clear();
            self.other_allergy = None;
        } else {
            self.allergies.remove(NONE_TOKEN);
        }
        self.allergies.insert(token);
    }

    pub fn deselect_allergy(&mut self, token: &str) {
        let token = canonical_token(token);
        self.allergies.remove(&token);
        if token == OTHER_TOKEN {
            self.other_allergy = None;
        }
    }

    /// Set the free-text detail for `other`, selecting it as a side effect.
    pub fn set_other_allergy(&mut self, detail: &str) {
        let detail = detail.trim();
        if detail.is_empty() {
            self.deselect_allergy(OTHER_TOKEN);
            return;
        }
        self.select_allergy(OTHER_TOKEN);
        self.other_allergy = Some(detail.to_string());
    }

    /// Lowercase and trim every stored token, dropping blanks.
    ///
    /// Profiles written by hand may say `"Milk"`; the editing methods
    /// already store canonical tokens.
    pub fn canonicalize(&mut self) {
        self.allergies = self
            .allergies
            .iter()
            .map(|t| canonical_token(t))
            .filter(|t| !t.is_empty())
            .collect();
        if let Some(detail) = &self.other_allergy {
            let detail = detail.trim();
            self.other_allergy = (!detail.is_empty()).then(|| detail.to_string());
        }
    }

    /// True when at least one allergy other than the `none` sentinel is declared.
    pub fn has_declared_allergies(&self) -> bool {
        self.allergies
            .iter()
            .map(|a| canonical_token(a))
            .any(|a| !a.is_empty() && a != NONE_TOKEN)
    }

    /// Terms to look for in allergen-risk text.
    ///
    /// Every declared token except `none`, lowercased; `other` is replaced
    /// by its comma-separated detail entries.
    pub fn match_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let mut push = |term: String| {
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        };
        for token in &self.allergies {
            match canonical_token(token).as_str() {
                NONE_TOKEN => {}
                OTHER_TOKEN => {
                    if let Some(detail) = &self.other_allergy {
                        detail.split(',').map(canonical_token).for_each(&mut push);
                    }
                }
                other => push(other.to_string()),
            }
        }
        terms
    }

    /// Reject tokens outside the survey vocabulary.
    pub fn validate(&self) -> Result<()> {
        for token in &self.allergies {
            if !is_known_token(token) {
                bail!(
                    "Unknown allergy '{}'; use one of: {}, {}, {}",
                    token,
                    KNOWN_ALLERGENS.join(", "),
                    OTHER_TOKEN,
                    NONE_TOKEN
                );
            }
        }
        Ok(())
    }
}

/// Persistence for the user's health profile.
pub trait ProfileStore {
    fn load(&self) -> Result<HealthProfile>;
    fn save(&self, profile: &HealthProfile) -> Result<()>;
}

/// TOML file-backed profile. A missing file is an empty profile.
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the profile, searching in order:
    ///
    /// 1. `profile_override`: path passed via `--profile`
    /// 2. `<base_dir>/.food-checkr/profile.toml`
    /// 3. `~/.config/food-checkr/profile.toml`
    ///
    /// When none exists the local path is used so a later save creates it.
    pub fn discover(base_dir: &Path, profile_override: Option<&Path>) -> Self {
        if let Some(path) = profile_override {
            return Self::new(path);
        }

        let local = base_dir.join(".food-checkr").join("profile.toml");
        if local.exists() {
            return Self::new(local);
        }

        if let Some(home) = dirs::home_dir() {
            let home_profile = home.join(".config").join("food-checkr").join("profile.toml");
            if home_profile.exists() {
                return Self::new(home_profile);
            }
        }

        Self::new(local)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Result<HealthProfile> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no health profile found");
            return Ok(HealthProfile::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read profile {}", self.path.display()))?;
        let mut profile: HealthProfile = toml::from_str(&content)
            .with_context(|| format!("Invalid profile {}", self.path.display()))?;
        profile.canonicalize();
        profile
            .validate()
            .with_context(|| format!("Invalid profile {}", self.path.display()))?;
        Ok(profile)
    }

    fn save(&self, profile: &HealthProfile) -> Result<()> {
        profile.validate()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(profile)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write profile {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_clears_others() {
        let mut p = HealthProfile::default();
        p.select_allergy("peanuts");
        p.set_other_allergy("kiwi");
        p.select_allergy("none");
        assert_eq!(p.allergies.iter().collect::<Vec<_>>(), vec!["none"]);
        assert_eq!(p.other_allergy, None);
        assert!(!p.has_declared_allergies());
    }

    #[test]
    fn test_other_token_removes_none() {
        let mut p = HealthProfile::default();
        p.select_allergy("none");
        p.select_allergy(" Milk ");
        assert_eq!(p.allergies.iter().collect::<Vec<_>>(), vec!["milk"]);
        assert!(p.has_declared_allergies());
    }

    #[test]
    fn test_match_terms_expand_other_detail() {
        let mut p = HealthProfile::default();
        p.select_allergy("soy");
        p.set_other_allergy("Kiwi, mustard seed, ");
        assert_eq!(p.match_terms(), vec!["kiwi", "mustard seed", "soy"]);

        p.deselect_allergy("other");
        assert_eq!(p.match_terms(), vec!["soy"]);
        assert_eq!(p.other_allergy, None);
    }

    #[test]
    fn test_validate_rejects_unknown_tokens() {
        let mut p = HealthProfile::default();
        p.select_allergy("peanuts");
        assert!(p.validate().is_ok());
        p.allergies.insert("bananas".to_string());
        let err = p.validate().unwrap_err().to_string();
        assert!(err.contains("bananas"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("nested").join("profile.toml"));
        assert_eq!(store.load().unwrap(), HealthProfile::default());

        let mut p = HealthProfile::default();
        p.select_allergy("peanuts");
        p.set_other_allergy("kiwi");
        p.dietary_preference = Some("vegetarian".to_string());
        store.save(&p).unwrap();

        assert_eq!(store.load().unwrap(), p);
    }

    #[test]
    fn test_file_store_reads_survey_style_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(
            &path,
            "allergies = [\"milk\", \"other\"]\notherAllergy = \"lupin\"\nsensitivities = \"caffeine\"\n",
        )
        .unwrap();
        let p = FileProfileStore::new(&path).load().unwrap();
        assert_eq!(p.match_terms(), vec!["milk", "lupin"]);
        assert_eq!(p.sensitivities.as_deref(), Some("caffeine"));
    }

    #[test]
    fn test_match_terms_ignore_token_case() {
        let mut p = HealthProfile::default();
        p.allergies.insert("Peanuts".to_string());
        p.allergies.insert(" peanuts".to_string());
        p.allergies.insert("NONE".to_string());
        assert!(p.has_declared_allergies());
        assert_eq!(p.match_terms(), vec!["peanuts"]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_file_store_accepts_mixed_case_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(
            &path,
            "allergies = [\"Milk\", \" Peanuts \", \"Other\"]\notherAllergy = \"  Lupin \"\n",
        )
        .unwrap();
        let p = FileProfileStore::new(&path).load().unwrap();
        assert_eq!(p.allergies.iter().collect::<Vec<_>>(), vec!["milk", "other", "peanuts"]);
        assert_eq!(p.other_allergy.as_deref(), Some("Lupin"));
        assert_eq!(p.match_terms(), vec!["milk", "lupin", "peanuts"]);
    }

    #[test]
    fn test_discover_prefers_override() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("mine.toml");
        let store = FileProfileStore::discover(dir.path(), Some(&explicit));
        assert_eq!(store.path(), explicit.as_path());
    }
}
