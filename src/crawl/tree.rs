// src/crawl/tree.rs
// =============================================================================
// Expands the shop's category menu into listing requests.
//
// The menu is a tree: every category has a path and (maybe) subcategories.
// We walk it depth-first and emit a category's children before the category
// itself (post-order), so the most specific listings are queued first.
//
// The walk uses an explicit stack instead of recursion, so a very deep menu
// cannot overflow the call stack.
// =============================================================================

use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::request::{listing_url, CrawlRequest};

// One node of the category menu
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    /// Site-relative locator, e.g. "/ovoce-a-zelenina"
    #[serde(rename = "url", alias = "path")]
    pub path: String,
    /// Nested categories; missing or null means a leaf
    #[serde(
        rename = "subcategories",
        alias = "children",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub children: Vec<Category>,
}

#[cfg(test)]
impl Category {
    pub fn leaf(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(path: impl Into<String>, children: Vec<Category>) -> Self {
        Self {
            path: path.into(),
            children,
        }
    }
}

// Body of the CATEGORIES response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryMenu {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<Category>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// Lazily yields one DETAIL request per category, children before parents.
//
// Calling it twice with the same root yields the same sequence.
pub fn expand(root: &[Category]) -> ListingRequests<'_> {
    let mut stack = Vec::with_capacity(root.len());
    // Reversed so the first category ends up on top of the stack
    stack.extend(root.iter().rev().map(|category| (category, false)));
    ListingRequests { stack }
}

// Iterator returned by `expand`.
//
// Each stack entry is (category, children_done). A category is yielded the
// second time it reaches the top, after all of its children.
#[derive(Debug)]
pub struct ListingRequests<'a> {
    stack: Vec<(&'a Category, bool)>,
}

impl<'a> Iterator for ListingRequests<'a> {
    type Item = CrawlRequest;

    fn next(&mut self) -> Option<CrawlRequest> {
        while let Some((category, children_done)) = self.stack.pop() {
            if !children_done {
                self.stack.push((category, true));
                self.stack
                    .extend(category.children.iter().rev().map(|child| (child, false)));
                continue;
            }

            match listing_url(&category.path) {
                Ok(url) => return Some(CrawlRequest::detail(url)),
                Err(e) => {
                    warn!(path = %category.path, error = %e, "skipping category with invalid path");
                }
            }
        }
        None
    }
}
