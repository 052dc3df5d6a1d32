use anyhow::{anyhow, Result};
use reqwest::{Client, Url};
use serde_json::{json, Value};

use crate::models::Product;

/// Look up a product (barcode or name) on the local backend.
pub async fn fetch_product(client: &Client, base: &str, query: &str) -> Result<Option<Value>> {
    let url = product_url(base, query)?;

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let data: Value = response.json().await?;
    if data.is_object() {
        Ok(Some(data))
    } else {
        Ok(None)
    }
}

/// Ask the backend for a free-text commentary on a product.
///
/// The text is only displayed, never interpreted. `Ok(None)` when the backend
/// declines or answers without an `explanation`.
pub async fn fetch_insight(client: &Client, base: &str, product: &Product) -> Result<Option<String>> {
    let url = format!("{}/api/analyze", base.trim_end_matches('/'));

    let response = client
        .post(&url)
        .json(&insight_request(product))
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let data: Value = response.json().await?;
    Ok(data
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

/// `{base}/api/product/{query}` with `query` encoded as one path segment.
fn product_url(base: &str, query: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Backend URL cannot be a base: {}", base))?
        .pop_if_empty()
        .extend(["api", "product", query]);
    Ok(url)
}

fn insight_request(product: &Product) -> Value {
    json!({
        "product_name": product.name,
        "ingredients": product.ingredients_text,
        "risks": product.allergen_risk_texts(),
    })
}
