use anyhow::Result;
use reqwest::Client;
use serde_json::{json, Value};

/// Fetch a product by barcode from Open Food Facts.
///
/// Returns the whole `{ status, product }` envelope so that shape detection
/// recognizes it; `Ok(None)` when the barcode is unknown.
pub async fn fetch_product(client: &Client, base: &str, barcode: &str) -> Result<Option<Value>> {
    let url = format!("{}/api/v0/product/{}.json", base.trim_end_matches('/'), barcode);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let data: Value = response.json().await?;
    Ok(found_envelope(data))
}

/// Full-text product search, at most `limit` results.
///
/// Each hit is wrapped in a found-envelope, matching [`fetch_product`].
pub async fn search_products(
    client: &Client,
    base: &str,
    query: &str,
    limit: usize,
) -> Result<Vec<Value>> {
    let url = format!("{}/cgi/search.pl", base.trim_end_matches('/'));
    let page_size = limit.max(1).to_string();

    let response = client
        .get(&url)
        .query(&[
            ("search_terms", query),
            ("search_simple", "1"),
            ("action", "process"),
            ("json", "1"),
            ("page_size", page_size.as_str()),
        ])
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(Vec::new());
    }

    let data: Value = response.json().await?;
    Ok(search_hits(&data, limit))
}

/// Keep the envelope only when Open Food Facts reports `status == 1`.
fn found_envelope(data: Value) -> Option<Value> {
    let found = data.get("status").and_then(Value::as_i64) == Some(1);
    if found && data.get("product").is_some_and(Value::is_object) {
        Some(data)
    } else {
        None
    }
}

fn search_hits(data: &Value, limit: usize) -> Vec<Value> {
    data.get("products")
        .and_then(Value::as_array)
        .map(|products| {
            products
                .iter()
                .filter(|p| p.is_object())
                .take(limit)
                .map(|p| json!({ "status": 1, "product": p }))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::detect_source;
    use crate::models::PayloadSource;

    #[test]
    fn test_found_envelope_requires_status_one() {
        let hit = json!({"status": 1, "product": {"product_name": "Cola"}});
        assert_eq!(found_envelope(hit.clone()), Some(hit));

        let miss = json!({"status": 0, "status_verbose": "product not found"});
        assert_eq!(found_envelope(miss), None);

        let odd = json!({"status": 1, "product": null});
        assert_eq!(found_envelope(odd), None);
    }

    #[test]
    fn test_search_hits_are_wrapped_and_limited() {
        let data = json!({
            "count": 3,
            "products": [
                {"product_name": "A"},
                "junk",
                {"product_name": "B"},
                {"product_name": "C"}
            ]
        });
        let hits = search_hits(&data, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1]["product"]["product_name"], "B");
        assert!(hits
            .iter()
            .all(|h| detect_source(h) == PayloadSource::OpenFoodFacts));

        assert!(search_hits(&json!({"count": 0}), 5).is_empty());
    }
}
