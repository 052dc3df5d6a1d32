use anyhow::Result;
use reqwest::Client;
use serde_json::Value;

/// First branded USDA FoodData Central match for `query` (a name or UPC).
pub async fn search_food(
    client: &Client,
    base: &str,
    api_key: &str,
    query: &str,
) -> Result<Option<Value>> {
    let url = format!("{}/foods/search", base.trim_end_matches('/'));

    let response = client
        .get(&url)
        .query(&[
            ("api_key", api_key),
            ("query", query),
            ("dataType", "Branded"),
            ("pageSize", "1"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        tracing::debug!(status = %response.status(), "USDA search rejected");
        return Ok(None);
    }

    let data: Value = response.json().await?;
    Ok(first_food(data))
}

fn first_food(data: Value) -> Option<Value> {
    match data {
        Value::Object(mut map) => match map.remove("foods")? {
            Value::Array(foods) => foods.into_iter().find(Value::is_object),
            _ => None,
        },
        _ => None,
    }
}
