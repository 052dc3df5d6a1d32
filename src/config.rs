use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Root configuration structure, deserialized from `.food-checkr/config.toml`.
///
/// Every section is optional; missing sections take their built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub regulatory: RegulatoryConfig,
    pub lookup: LookupConfig,
    pub logging: LoggingConfig,
}

/// Penalties feeding the concern rule table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Penalty per Nutri-Score grade, keyed by lowercase letter.
    /// `unknown` is deliberately absent: an unknown grade costs nothing.
    pub grade_penalties: BTreeMap<String, u32>,
    /// The additive penalty applies when a product lists more than this many.
    pub additive_threshold: usize,
    pub additive_penalty: u32,
    /// Phrases whose presence in the ingredient text costs a penalty.
    pub ingredient_penalties: BTreeMap<String, u32>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut grade_penalties = BTreeMap::new();
        grade_penalties.insert("e".to_string(), 40);
        grade_penalties.insert("d".to_string(), 25);
        grade_penalties.insert("c".to_string(), 10);

        let mut ingredient_penalties = BTreeMap::new();
        ingredient_penalties.insert("palm oil".to_string(), 10);

        ScoringConfig {
            grade_penalties,
            additive_threshold: 5,
            additive_penalty: 20,
            ingredient_penalties,
        }
    }
}

/// Ingredients banned or restricted somewhere, with the jurisdictions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegulatoryConfig {
    pub banned: BTreeMap<String, Vec<String>>,
}

impl Default for RegulatoryConfig {
    fn default() -> Self {
        let entries: [(&str, &[&str]); 13] = [
            ("Potassium Bromate", &["EU", "UK", "Canada", "Brazil", "Argentina"]),
            ("BVO", &["EU", "Japan", "India"]),
            ("Brominated Vegetable Oil", &["EU", "Japan", "India"]),
            ("Azodicarbonamide", &["EU", "Australia", "Singapore", "UK"]),
            ("rBGH", &["EU", "Canada", "Australia", "New Zealand", "Japan"]),
            ("rBST", &["EU", "Canada", "Australia", "New Zealand", "Japan"]),
            ("BHA", &["Japan", "Some EU countries"]),
            ("BHT", &["Japan", "Some EU countries"]),
            ("Tartrazine", &["Norway", "Austria"]),
            ("Sodium Cyclamate", &["United States"]),
            ("Titanium Dioxide", &["EU (food use)"]),
            ("Olestra", &["EU", "Canada"]),
            ("Ractopamine", &["EU", "China", "Russia"]),
        ];

        RegulatoryConfig {
            banned: entries
                .iter()
                .map(|(name, regions)| {
                    (
                        name.to_string(),
                        regions.iter().map(|r| r.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// Upstream product data services.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub open_food_facts_url: String,
    pub backend_url: String,
    pub usda_url: String,
    /// Overridden by the `USDA_API_KEY` environment variable.
    pub usda_api_key: Option<String>,
    pub timeout_secs: u64,
    /// Number of lookups issued concurrently.
    pub batch_size: usize,
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            open_food_facts_url: "https://world.openfoodfacts.org".to_string(),
            backend_url: "http://127.0.0.1:8000".to_string(),
            usda_url: "https://api.nal.usda.gov/fdc/v1".to_string(),
            usda_api_key: None,
            timeout_secs: 10,
            batch_size: 25,
            user_agent: format!("food-checkr/{} (food safety tool)", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LookupConfig {
    /// The USDA key, preferring the environment over the config file.
    pub fn usda_key(&self) -> Option<String> {
        std::env::var("USDA_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.usda_api_key.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` level or EnvFilter directive; `FOOD_CHECKR_LOG` wins.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<base_dir>/.food-checkr/config.toml`
/// 3. `~/.config/food-checkr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(base_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = base_dir.join(".food-checkr").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("food-checkr").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}
