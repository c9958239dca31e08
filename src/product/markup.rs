// src/product/markup.rs
// =============================================================================
// Structured data for a product record: a schema.org `Product` in JSON-LD,
// stored next to the record so consumers can index it directly.
// =============================================================================

use serde_json::{json, Map, Value};

use super::record::ProductRecord;

pub fn to_product_markup(record: &ProductRecord, currency: &str) -> Value {
    let availability = if record.in_stock {
        "https://schema.org/InStock"
    } else {
        "https://schema.org/OutOfStock"
    };

    let mut offer = json!({
        "@type": "Offer",
        "url": record.item_url,
        "price": record.current_price,
        "priceCurrency": currency,
        "availability": availability,
    });
    if let Some(original) = record.original_price {
        offer["priceSpecification"] = json!({
            "@type": "UnitPriceSpecification",
            "priceType": "https://schema.org/ListPrice",
            "price": original,
            "priceCurrency": currency,
        });
    }

    let mut product = Map::new();
    product.insert("@context".into(), json!("https://schema.org"));
    product.insert("@type".into(), json!("Product"));
    product.insert("@id".into(), json!(record.item_url));
    product.insert("sku".into(), json!(record.item_id));
    product.insert("name".into(), json!(record.item_name));
    product.insert("url".into(), json!(record.item_url));
    if !record.category.is_empty() {
        product.insert("category".into(), json!(record.category));
    }
    if let Some(image) = &record.image {
        product.insert("image".into(), json!(image));
    }
    product.insert("offers".into(), offer);

    Value::Object(product)
}
