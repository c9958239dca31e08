// src/crawl/pagination.rs
// =============================================================================
// Follows a listing's "more" link to its next page.
//
// The API tells us where the next page is; when it stops doing so, the
// listing is exhausted. There is no page cap here: the chain ends when the
// site says it ends.
// =============================================================================

use tracing::warn;
use url::Url;

use super::request::CrawlRequest;
use crate::product::ListingPage;

// Returns the request for the next page of `page`, if there is one.
//
// Relative "more" links are resolved against `base`.
pub fn continue_pagination(page: &ListingPage, base: &Url) -> Option<CrawlRequest> {
    let more = page.more_url()?.trim();
    if more.is_empty() {
        return None;
    }

    match base.join(more) {
        Ok(url) => Some(CrawlRequest::detail(url)),
        Err(e) => {
            warn!(more, error = %e, "listing advertised an unusable next page");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::request::{Step, BASE_URL};

    fn base() -> Url {
        Url::parse(BASE_URL).unwrap()
    }

    #[test]
    fn test_more_url_yields_detail_request() {
        let page = ListingPage::new(vec![], vec![], Some("/next"));
        let request = continue_pagination(&page, &base()).unwrap();

        assert_eq!(request.step, Step::Detail);
        assert_eq!(request.target.as_str(), "https://www.kosik.cz/next");
    }

    #[test]
    fn test_absolute_more_url_kept() {
        let more = "https://www.kosik.cz/api/web/page/products?slug=ovoce&limit=60&offset=60";
        let page = ListingPage::new(vec![], vec![], Some(more));

        assert_eq!(continue_pagination(&page, &base()).unwrap().target.as_str(), more);
    }

    #[test]
    fn test_missing_more_url_ends_chain() {
        let page = ListingPage::new(vec![], vec![], None);
        assert!(continue_pagination(&page, &base()).is_none());
    }

    #[test]
    fn test_empty_more_url_ends_chain() {
        let page = ListingPage::new(vec![], vec![], Some(""));
        assert!(continue_pagination(&page, &base()).is_none());
    }
}
