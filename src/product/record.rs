// src/product/record.rs
// =============================================================================
// Turns a raw listed item into the canonical product record.
//
// Field rules:
// - discounted is true only for a positive discount percentage
// - originalPrice is left empty when it equals the current price, so no
//   strike-through price is shown for items that are not really discounted
// - inStock is false while the item has a "first order day" in the future
// - itemUrl is absolute, resolved against the shop's base URL
//
// `normalize` is pure: the same item and breadcrumb path always give the
// same record.
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ItemError;

// A product exactly as the listing API delivers it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    /// Site-relative product URL
    pub url: String,
    pub price: f64,
    #[serde(default)]
    pub recommended_price: Option<f64>,
    #[serde(default)]
    pub percentage_discount: Option<f64>,
    /// Set while the product cannot be ordered yet
    #[serde(default)]
    pub first_order_day: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
}

// Item ids come as numbers from the API but are plain strings to us
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}

impl RawItem {
    pub fn from_value(value: &Value) -> Result<Self, ItemError> {
        Ok(RawItem::deserialize(value)?)
    }
}

// The record handed to the output sink
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub item_id: String,
    pub item_url: String,
    pub item_name: String,
    pub discounted: bool,
    /// e.g. "25 %"; only set for discounted items
    #[serde(rename = "discountedName")]
    pub discounted_label: Option<String>,
    pub current_price: f64,
    /// Price before the discount; None when it equals the current price
    pub original_price: Option<f64>,
    pub in_stock: bool,
    /// Breadcrumb path, or the page title when the page has no breadcrumbs
    pub category: String,
    #[serde(rename = "img")]
    pub image: Option<String>,
}

impl ProductRecord {
    // Storage key for this record: last segment of the product URL, or the
    // item id when the URL has no usable path.
    pub fn slug(&self) -> String {
        Url::parse(&self.item_url)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.item_id.clone())
    }
}

pub fn normalize(
    item: &RawItem,
    breadcrumb_path: &str,
    base: &Url,
) -> Result<ProductRecord, ItemError> {
    let item_url = base.join(&item.url).map_err(|source| ItemError::InvalidUrl {
        id: item.id.clone(),
        url: item.url.clone(),
        source,
    })?;

    let discount = item.percentage_discount.unwrap_or(0.0);
    let discounted = discount > 0.0;

    let original_price = match item.recommended_price {
        Some(recommended) if recommended != item.price => Some(recommended),
        _ => None,
    };

    Ok(ProductRecord {
        item_id: item.id.clone(),
        item_url: item_url.to_string(),
        item_name: item.name.clone(),
        discounted,
        discounted_label: discounted.then(|| format!("{} %", discount)),
        current_price: item.price,
        original_price,
        in_stock: !is_truthy(item.first_order_day.as_ref()),
        category: breadcrumb_path.to_string(),
        image: item.image.clone(),
    })
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
