// src/product/mod.rs
// =============================================================================
// Everything about products once a listing page is fetched:
// - listing: the DETAIL response body
// - record:  raw item -> canonical ProductRecord
// - dedup:   one record per item id per run
// - markup:  schema.org JSON-LD for a record
// - sink:    where records end up
// =============================================================================

mod dedup;
mod listing;
mod markup;
mod record;
mod sink;

pub use dedup::DedupRegistry;
pub use listing::ListingPage;
pub use markup::to_product_markup;
pub use record::{normalize, ProductRecord, RawItem};
pub use sink::{shop_name, JsonLinesSink, OutputSink, PublishManifest};
