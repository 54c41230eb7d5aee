//! Recognize scanned e-invoice QR codes.

use async_trait::async_trait;
use tracing::debug;

use crate::decoder::{is_taiwan_einvoice, TaiwanInvoiceDecoder};
use crate::export::extract_items_from_taiwan_invoice;

use super::{BarcodeResolver, ItemRecognition, RecognitionSource};

/// Confidence attached to an item taken from a decoded e-invoice.
const EINVOICE_CONFIDENCE: u8 = 95;

/// Resolver that decodes e-invoice payloads and reports their first item.
#[derive(Debug, Clone)]
pub struct EInvoiceResolver {
    decoder: TaiwanInvoiceDecoder,
    user_language: String,
}

impl EInvoiceResolver {
    pub fn new(user_language: &str) -> Self {
        Self {
            decoder: TaiwanInvoiceDecoder::new(),
            user_language: user_language.to_string(),
        }
    }

    /// Use a specific decoder (e.g. one with a fixed clock).
    pub fn with_decoder(mut self, decoder: TaiwanInvoiceDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    fn recognize(&self, data: &str) -> Option<ItemRecognition> {
        if !is_taiwan_einvoice(data, Some(&self.user_language)) {
            return None;
        }

        debug!("Detected Taiwan e-invoice QR code, decoding");
        let invoice = self.decoder.decode(data);
        if !invoice.is_valid {
            debug!("Taiwan e-invoice decode failed: {:?}", invoice.error);
            return None;
        }

        let item = extract_items_from_taiwan_invoice(&invoice).into_iter().next()?;
        Some(ItemRecognition {
            name: item.name,
            description: item.description,
            category: item.category,
            subcategory: None,
            confidence: EINVOICE_CONFIDENCE,
            language: Some(self.user_language.clone()),
            source: RecognitionSource::EInvoice,
        })
    }
}

#[async_trait]
impl BarcodeResolver for EInvoiceResolver {
    fn name(&self) -> &'static str {
        "e-invoice"
    }

    async fn try_resolve(&self, barcode: &str) -> Option<ItemRecognition> {
        self.recognize(barcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_invoice_payload_resolves_to_first_item() {
        let resolver = EInvoiceResolver::new("en");
        let found = resolver
            .try_resolve("發票號碼: AB12345678\n賣方: 全聯\n鮮奶 1 89 89\n總金額: 89")
            .await
            .unwrap();

        assert_eq!(found.name, "鮮奶");
        assert_eq!(found.description, "Taiwan e-invoice item from 全聯");
        assert_eq!(found.category, "Taiwan Import");
        assert_eq!(found.confidence, 95);
        assert_eq!(found.language.as_deref(), Some("en"));
        assert_eq!(found.source, RecognitionSource::EInvoice);
    }

    #[tokio::test]
    async fn test_plain_barcode_passes_through_in_strict_mode() {
        let resolver = EInvoiceResolver::new("en");
        assert_eq!(resolver.try_resolve("4710901898748").await, None);
        assert_eq!(resolver.try_resolve("https://example.com").await, None);
    }
}
