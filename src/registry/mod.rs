//! Async HTTP clients for fetching raw product payloads from upstream services.
//!
//! Every fetch returns `Ok(Some(raw))` on success, `Ok(None)` when the product
//! is not found, and `Err` on network failures. Raw payloads are turned into
//! products by [`crate::normalizer`].

pub mod backend;
pub mod open_food_facts;
pub mod usda;

use anyhow::Result;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::config::LookupConfig;
use crate::models::PayloadSource;

/// A raw payload together with the service it came from.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub source: PayloadSource,
    pub raw: Value,
}

impl Fetched {
    fn new(source: PayloadSource, raw: Value) -> Self {
        Self { source, raw }
    }
}

/// What a free-form lookup query names.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Barcode(String),
    Text(String),
}

/// 8 to 14 digits is an EAN/UPC barcode; anything else is searched as text.
pub fn classify_query(query: &str) -> Result<Query> {
    let barcode_re = Regex::new(r"^\d{8,14}$")?;
    let query = query.trim();
    if barcode_re.is_match(query) {
        Ok(Query::Barcode(query.to_string()))
    } else {
        Ok(Query::Text(query.to_string()))
    }
}

/// Resolve a barcode.
///
/// With `use_backend` only the local backend is asked. Otherwise Open Food
/// Facts is tried first, then USDA when an API key is configured.
pub async fn lookup_barcode(
    client: &Client,
    config: &LookupConfig,
    barcode: &str,
    use_backend: bool,
) -> Result<Option<Fetched>> {
    if use_backend {
        let raw = backend::fetch_product(client, &config.backend_url, barcode).await?;
        return Ok(raw.map(|r| Fetched::new(PayloadSource::Backend, r)));
    }

    if let Some(raw) =
        open_food_facts::fetch_product(client, &config.open_food_facts_url, barcode).await?
    {
        return Ok(Some(Fetched::new(PayloadSource::OpenFoodFacts, raw)));
    }

    usda_fallback(client, config, barcode).await
}

/// Resolve a text query to at most `limit` products, in the same source order
/// as [`lookup_barcode`].
pub async fn search(
    client: &Client,
    config: &LookupConfig,
    query: &str,
    limit: usize,
    use_backend: bool,
) -> Result<Vec<Fetched>> {
    if use_backend {
        let raw = backend::fetch_product(client, &config.backend_url, query).await?;
        return Ok(raw
            .map(|r| Fetched::new(PayloadSource::Backend, r))
            .into_iter()
            .collect());
    }

    let hits =
        open_food_facts::search_products(client, &config.open_food_facts_url, query, limit).await?;
    if !hits.is_empty() {
        return Ok(hits
            .into_iter()
            .map(|r| Fetched::new(PayloadSource::OpenFoodFacts, r))
            .collect());
    }

    Ok(usda_fallback(client, config, query).await?.into_iter().collect())
}

async fn usda_fallback(client: &Client, config: &LookupConfig, query: &str) -> Result<Option<Fetched>> {
    let Some(key) = config.usda_key() else {
        return Ok(None);
    };
    tracing::debug!(query, "falling back to USDA FoodData Central");
    let raw = usda::search_food(client, &config.usda_url, &key, query).await?;
    Ok(raw.map(|r| Fetched::new(PayloadSource::Usda, r)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_query() {
        assert_eq!(
            classify_query("3017620422003").unwrap(),
            Query::Barcode("3017620422003".to_string())
        );
        assert_eq!(
            classify_query(" 04963406 ").unwrap(),
            Query::Barcode("04963406".to_string())
        );
        // too short, too long, not all digits
        assert!(matches!(classify_query("1234567").unwrap(), Query::Text(_)));
        assert!(matches!(classify_query("123456789012345").unwrap(), Query::Text(_)));
        assert_eq!(
            classify_query("nutella 400g").unwrap(),
            Query::Text("nutella 400g".to_string())
        );
    }
}
