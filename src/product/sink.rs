// src/product/sink.rs
// =============================================================================
// Where normalized products go.
//
// The scheduler only knows the `OutputSink` trait. The shipped
// implementation, `JsonLinesSink`, writes two files into an output directory:
// - products.jsonl: one record per line, tagged with shop and slug
// - markup.jsonl:   one JSON-LD document per line, keyed by slug
//
// After a production run a small publish manifest tells the external
// uploader which warehouse table and CDN path the export belongs to.
// =============================================================================

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use super::record::ProductRecord;
use crate::error::SinkError;

#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Receives each record at most once per run
    async fn emit(&self, record: &ProductRecord, shop: &str, slug: &str) -> Result<(), SinkError>;

    /// Receives the structured markup of an emitted record
    async fn store_markup(&self, slug: &str, markup: &Value) -> Result<(), SinkError>;

    /// Called once after the crawl drained
    async fn finish(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

// Shop identifier derived from the base URL: host without "www."
pub fn shop_name(base: &Url) -> String {
    let host = base.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

#[derive(Serialize)]
struct ProductLine<'a> {
    #[serde(flatten)]
    record: &'a ProductRecord,
    shop: &'a str,
    slug: &'a str,
}

#[derive(Serialize)]
struct MarkupLine<'a> {
    slug: &'a str,
    markup: &'a Value,
}

#[derive(Debug)]
pub struct JsonLinesSink {
    dir: PathBuf,
    products: Mutex<BufWriter<File>>,
    markup: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    pub const PRODUCTS_FILE: &'static str = "products.jsonl";
    pub const MARKUP_FILE: &'static str = "markup.jsonl";

    // Creates the output directory and truncates both files
    pub async fn create(dir: impl AsRef<Path>) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;

        let products = File::create(dir.join(Self::PRODUCTS_FILE)).await?;
        let markup = File::create(dir.join(Self::MARKUP_FILE)).await?;
        info!(dir = %dir.display(), "writing products");

        Ok(Self {
            dir,
            products: Mutex::new(BufWriter::new(products)),
            markup: Mutex::new(BufWriter::new(markup)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

async fn write_line<T: Serialize>(
    writer: &Mutex<BufWriter<File>>,
    value: &T,
) -> Result<(), SinkError> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    writer.lock().await.write_all(&line).await?;
    Ok(())
}

#[async_trait]
impl OutputSink for JsonLinesSink {
    async fn emit(&self, record: &ProductRecord, shop: &str, slug: &str) -> Result<(), SinkError> {
        write_line(&self.products, &ProductLine { record, shop, slug }).await?;
        debug!(item_id = %record.item_id, slug, "record written");
        Ok(())
    }

    async fn store_markup(&self, slug: &str, markup: &Value) -> Result<(), SinkError> {
        write_line(&self.markup, &MarkupLine { slug, markup }).await
    }

    async fn finish(&self) -> Result<(), SinkError> {
        self.products.lock().await.flush().await?;
        self.markup.lock().await.flush().await?;
        Ok(())
    }
}

// Hand-off note for the external publisher (warehouse upload, CDN refresh)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishManifest {
    pub table: String,
    pub cdn_path: String,
    pub records: usize,
    pub failed_requests: usize,
}

impl PublishManifest {
    pub const FILE: &'static str = "publish.json";

    pub async fn write(&self, dir: impl AsRef<Path>) -> Result<PathBuf, SinkError> {
        let path = dir.as_ref().join(Self::FILE);
        fs::write(&path, serde_json::to_vec_pretty(self)?).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> ProductRecord {
        ProductRecord {
            item_id: "7".to_string(),
            item_url: "https://www.kosik.cz/p/mleko".to_string(),
            item_name: "Mléko".to_string(),
            discounted: false,
            discounted_label: None,
            current_price: 24.9,
            original_price: None,
            in_stock: true,
            category: "Mléčné".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_shop_name_strips_www() {
        let base = Url::parse("https://www.kosik.cz/").unwrap();
        assert_eq!(shop_name(&base), "kosik.cz");
    }

    #[tokio::test]
    async fn test_json_lines_written() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonLinesSink::create(dir.path()).await.unwrap();

        sink.emit(&record(), "kosik.cz", "mleko").await.unwrap();
        sink.store_markup("mleko", &json!({ "@type": "Product" })).await.unwrap();
        sink.finish().await.unwrap();

        let products =
            std::fs::read_to_string(dir.path().join(JsonLinesSink::PRODUCTS_FILE)).unwrap();
        let line: Value = serde_json::from_str(products.trim()).unwrap();
        assert_eq!(line["itemId"], "7");
        assert_eq!(line["shop"], "kosik.cz");
        assert_eq!(line["slug"], "mleko");
        assert_eq!(line["originalPrice"], Value::Null);

        let markup = std::fs::read_to_string(dir.path().join(JsonLinesSink::MARKUP_FILE)).unwrap();
        let line: Value = serde_json::from_str(markup.trim()).unwrap();
        assert_eq!(line["markup"]["@type"], "Product");
    }

    #[tokio::test]
    async fn test_publish_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = PublishManifest {
            table: "kosik_bf".to_string(),
            cdn_path: "kosik.cz".to_string(),
            records: 3,
            failed_requests: 0,
        };

        let path = manifest.write(dir.path()).await.unwrap();
        let written: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(written["table"], "kosik_bf");
        assert_eq!(written["cdnPath"], "kosik.cz");
    }
}
