// src/product/listing.rs
// =============================================================================
// The body of a DETAIL response: one page of a product listing.
//
// Wire shape (only the fields we use):
//   {
//     "title": "Ovoce",
//     "breadcrumbs": [{ "name": "Ovoce a zelenina" }, { "name": "Ovoce" }],
//     "products": { "items": [ ... ], "more": "/api/web/page/products?..." }
//   }
//
// Items stay as raw JSON values. Each one is decoded on its own, so a single
// malformed item cannot make the whole page unreadable.
// =============================================================================

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Breadcrumb {
    /// Missing or null on some crumbs; those are left out of the path
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Products {
    #[serde(default, deserialize_with = "null_as_empty")]
    items: Vec<Value>,
    #[serde(default)]
    more: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    breadcrumbs: Option<Vec<Breadcrumb>>,
    #[serde(default)]
    products: Products,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
impl ListingPage {
    pub fn new(items: Vec<Value>, breadcrumbs: Vec<&str>, more_url: Option<&str>) -> Self {
        Self {
            title: None,
            breadcrumbs: Some(
                breadcrumbs
                    .into_iter()
                    .map(|name| Breadcrumb {
                        name: Some(name.to_string()),
                    })
                    .collect(),
            ),
            products: Products {
                items,
                more: more_url.map(str::to_string),
            },
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

impl ListingPage {
    /// Raw items in page order
    pub fn items(&self) -> &[Value] {
        &self.products.items
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        self.breadcrumbs.as_deref().unwrap_or_default()
    }

    /// Next page locator, if the page advertises one
    pub fn more_url(&self) -> Option<&str> {
        self.products.more.as_deref()
    }

    // Category label for every item on this page.
    //
    // Breadcrumb names joined with " > " win; the page title is only used
    // when no breadcrumb carries a name.
    pub fn breadcrumb_path(&self) -> String {
        let names: Vec<&str> = self
            .breadcrumbs()
            .iter()
            .filter_map(|crumb| crumb.name.as_deref())
            .collect();
        if names.is_empty() {
            return self.title.clone().unwrap_or_default();
        }
        names.join(" > ")
    }
}
