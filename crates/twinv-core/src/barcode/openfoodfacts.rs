//! OpenFoodFacts product lookup.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::RecognitionError;

use super::{BarcodeResolver, ItemRecognition, RecognitionSource};

const OPENFOODFACTS_CONFIDENCE: u8 = 85;

/// Resolver querying `GET {base}/api/v0/product/{barcode}.json`.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsResolver {
    client: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsResolver {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Product URL, or `None` when `barcode` is not a plain alphanumeric code.
    fn product_url(&self, barcode: &str) -> Option<String> {
        if barcode.is_empty() || !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(format!("{}/api/v0/product/{}.json", self.base_url, barcode))
    }

    async fn lookup(&self, barcode: &str) -> Result<Option<ItemRecognition>, RecognitionError> {
        let Some(url) = self.product_url(barcode) else {
            debug!("Skipping OpenFoodFacts for non-alphanumeric code {:?}", barcode);
            return Ok(None);
        };

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RecognitionError::Status {
                service: "OpenFoodFacts".to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json().await?;
        Ok(product_from_response(barcode, &body))
    }
}

/// Map an OpenFoodFacts response; `None` unless `status` is 1 with a product.
pub fn product_from_response(barcode: &str, body: &Value) -> Option<ItemRecognition> {
    if body.get("status").and_then(Value::as_i64) != Some(1) {
        return None;
    }
    let product = body.get("product").filter(|p| p.is_object())?;

    let text = |key: &str| {
        product
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    let category_tag = |i: usize| {
        product
            .get("categories_tags")
            .and_then(|tags| tags.get(i))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| s.replace('-', " "))
    };

    Some(ItemRecognition {
        name: text("product_name")
            .or_else(|| text("product_name_en"))
            .unwrap_or("Unknown Product")
            .to_string(),
        description: text("generic_name")
            .or_else(|| text("product_name"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Product with barcode {}", barcode)),
        category: category_tag(0).unwrap_or_else(|| "Miscellaneous".to_string()),
        subcategory: Some(category_tag(1).unwrap_or_else(|| "General".to_string())),
        confidence: OPENFOODFACTS_CONFIDENCE,
        language: None,
        source: RecognitionSource::OpenFoodFacts,
    })
}

#[async_trait]
impl BarcodeResolver for OpenFoodFactsResolver {
    fn name(&self) -> &'static str {
        "openfoodfacts"
    }

    async fn try_resolve(&self, barcode: &str) -> Option<ItemRecognition> {
        match self.lookup(barcode).await {
            Ok(found) => found,
            Err(e) => {
                debug!("External barcode lookup failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_product_mapping() {
        let body = json!({
            "status": 1,
            "product": {
                "product_name": "Mini Oreo",
                "generic_name": "Biscuits",
                "categories_tags": ["en:sweet-snacks", "en:chocolate-biscuits", "en:cookies"]
            }
        });
        let found = product_from_response("7622300761349", &body).unwrap();

        assert_eq!(found.name, "Mini Oreo");
        assert_eq!(found.description, "Biscuits");
        assert_eq!(found.category, "en:sweet snacks");
        assert_eq!(found.subcategory.as_deref(), Some("en:chocolate biscuits"));
        assert_eq!(found.confidence, 85);
    }

    #[test]
    fn test_sparse_product() {
        let body = json!({"status": 1, "product": {"product_name_en": "Rice Cracker"}});
        let found = product_from_response("123", &body).unwrap();

        assert_eq!(found.name, "Rice Cracker");
        assert_eq!(found.description, "Product with barcode 123");
        assert_eq!(found.category, "Miscellaneous");
        assert_eq!(found.subcategory.as_deref(), Some("General"));
    }

    #[test]
    fn test_unknown_product() {
        let body = json!({"status": 0, "status_verbose": "product not found"});
        assert_eq!(product_from_response("123", &body), None);
        assert_eq!(product_from_response("123", &json!({"status": 1})), None);
    }

    #[test]
    fn test_product_url() {
        let resolver = OpenFoodFactsResolver::new(reqwest::Client::new(), "https://world.openfoodfacts.org/");
        assert_eq!(
            resolver.product_url("4710901898748").as_deref(),
            Some("https://world.openfoodfacts.org/api/v0/product/4710901898748.json")
        );
    }

    #[test]
    fn test_product_url_rejects_path_characters() {
        let resolver = OpenFoodFactsResolver::new(reqwest::Client::new(), "https://world.openfoodfacts.org");

        for code in ["12/34", "123?x=1", "123#frag", "../admin", "47 10", "", "條碼123"] {
            assert_eq!(resolver.product_url(code), None, "{:?}", code);
        }
    }

    #[tokio::test]
    async fn test_unsafe_code_is_not_requested() {
        // Unroutable base: any request would fail with a transport error
        let resolver = OpenFoodFactsResolver::new(reqwest::Client::new(), "http://127.0.0.1:9");
        assert!(matches!(resolver.lookup("a/b?c").await, Ok(None)));
    }
}
