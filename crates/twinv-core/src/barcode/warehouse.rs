//! Warehouse barcode API: lookup of known barcodes and storage of new ones.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RecognitionError;

use super::{BarcodeResolver, BarcodeStore, ItemRecognition, RecognitionSource};

/// Confidence of warehouse records that carry none.
const DEFAULT_RECORD_CONFIDENCE: u8 = 90;

const BARCODES_PATH: &str = "/api/warehouse/barcodes";

/// Lookup response: `{found, data}`.
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub found: bool,
    pub data: Option<BarcodeRecord>,
}

/// A barcode record stored by the warehouse.
#[derive(Debug, Deserialize)]
pub struct BarcodeRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub confidence: Option<u8>,
}

impl LookupResponse {
    pub fn into_recognition(self) -> Option<ItemRecognition> {
        if !self.found {
            return None;
        }

        let record = self.data?;
        Some(ItemRecognition {
            name: record.name,
            description: record.description.unwrap_or_default(),
            category: record.category,
            subcategory: record.subcategory.filter(|s| !s.is_empty()),
            confidence: record
                .confidence
                .filter(|c| *c > 0)
                .unwrap_or(DEFAULT_RECORD_CONFIDENCE),
            language: None,
            source: RecognitionSource::Warehouse,
        })
    }
}

/// Body of a save request. Model results are stored unverified.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequest<'a> {
    barcode: &'a str,
    name: &'a str,
    description: &'a str,
    category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subcategory: Option<&'a str>,
    confidence: u8,
    source: &'a str,
    is_verified: bool,
}

/// HTTP client for the warehouse barcode endpoint.
#[derive(Debug, Clone)]
pub struct WarehouseClient {
    client: reqwest::Client,
    endpoint: String,
}

impl WarehouseClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), BARCODES_PATH),
        }
    }

    /// Look up a stored barcode.
    pub async fn lookup(&self, barcode: &str) -> Result<Option<ItemRecognition>, RecognitionError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("barcode", barcode)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RecognitionError::Status {
                service: "warehouse".to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: LookupResponse = response.json().await?;
        Ok(body.into_recognition())
    }
}

#[async_trait]
impl BarcodeStore for WarehouseClient {
    async fn save(&self, barcode: &str, recognition: &ItemRecognition) -> Result<(), RecognitionError> {
        let request = SaveRequest {
            barcode,
            name: &recognition.name,
            description: &recognition.description,
            category: &recognition.category,
            subcategory: recognition.subcategory.as_deref(),
            confidence: recognition.confidence,
            source: "ai",
            is_verified: false,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(RecognitionError::Status {
                service: "warehouse".to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

/// Resolver backed by the warehouse barcode database.
#[derive(Debug, Clone)]
pub struct WarehouseResolver {
    client: Arc<WarehouseClient>,
}

impl WarehouseResolver {
    pub fn new(client: Arc<WarehouseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BarcodeResolver for WarehouseResolver {
    fn name(&self) -> &'static str {
        "warehouse"
    }

    async fn try_resolve(&self, barcode: &str) -> Option<ItemRecognition> {
        match self.client.lookup(barcode).await {
            Ok(found) => found,
            Err(e) => {
                debug!("Warehouse barcode lookup failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup(json: &str) -> Option<ItemRecognition> {
        serde_json::from_str::<LookupResponse>(json).unwrap().into_recognition()
    }

    #[test]
    fn test_found_record() {
        let found = lookup(
            r#"{"found": true, "data": {"name": "義美小泡芙", "category": "Food", "subcategory": "", "confidence": 100}}"#,
        )
        .unwrap();

        assert_eq!(found.name, "義美小泡芙");
        assert_eq!(found.description, "");
        assert_eq!(found.subcategory, None);
        assert_eq!(found.confidence, 100);
        assert_eq!(found.source, RecognitionSource::Warehouse);
    }

    #[test]
    fn test_default_confidence() {
        let found = lookup(r#"{"found": true, "data": {"name": "Tea", "category": "Food"}}"#).unwrap();
        assert_eq!(found.confidence, 90);
    }

    #[test]
    fn test_not_found() {
        assert_eq!(lookup(r#"{"found": false}"#), None);
        assert_eq!(lookup(r#"{"found": true, "data": null}"#), None);
    }

    #[test]
    fn test_endpoint() {
        let client = WarehouseClient::new(reqwest::Client::new(), "http://nas.local:3000/");
        assert_eq!(client.endpoint, "http://nas.local:3000/api/warehouse/barcodes");
    }

    #[test]
    fn test_save_request_shape() {
        let request = SaveRequest {
            barcode: "4711111111111",
            name: "Oolong Tea",
            description: "Bottled tea",
            category: "Food & Beverages",
            subcategory: None,
            confidence: 88,
            source: "ai",
            is_verified: false,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["isVerified"], false);
        assert_eq!(json["source"], "ai");
        assert!(json.get("subcategory").is_none());
    }
}
