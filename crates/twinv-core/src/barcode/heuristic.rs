//! Last-resort recognition from the GS1 prefix.

use async_trait::async_trait;

use super::format::detect_barcode_format;
use super::{BarcodeResolver, ItemRecognition, RecognitionSource};

/// GS1 prefix assigned to Taiwan.
const TAIWAN_PREFIX: &str = "471";

/// GS1 prefix common on international consumer brands.
const INTERNATIONAL_PREFIX: &str = "762";

/// Describe `barcode` from its prefix and format alone.
pub fn recognize_by_prefix(barcode: &str) -> ItemRecognition {
    let (name, description, subcategory, confidence) = if barcode.starts_with(TAIWAN_PREFIX) {
        (
            format!("Taiwan Product ({})", barcode),
            format!(
                "Taiwan-produced product with barcode {}. 471 prefix indicates Taiwan origin.",
                barcode
            ),
            Some("Taiwan Product"),
            70,
        )
    } else if barcode.starts_with(INTERNATIONAL_PREFIX) {
        (
            format!("Consumer Product ({})", barcode),
            format!(
                "International consumer product with barcode {}. 762 prefix indicates major brand products across various categories.",
                barcode
            ),
            Some("General"),
            75,
        )
    } else {
        (
            format!("Product {}", barcode),
            format!(
                "{} barcode product. Please verify product details manually.",
                detect_barcode_format(barcode)
            ),
            None,
            50,
        )
    };

    ItemRecognition {
        name,
        description,
        category: "Miscellaneous".to_string(),
        subcategory: subcategory.map(str::to_string),
        confidence,
        language: None,
        source: RecognitionSource::Heuristic,
    }
}

/// Resolver that always answers with [`recognize_by_prefix`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixHeuristicResolver;

#[async_trait]
impl BarcodeResolver for PrefixHeuristicResolver {
    fn name(&self) -> &'static str {
        "prefix-heuristic"
    }

    async fn try_resolve(&self, barcode: &str) -> Option<ItemRecognition> {
        Some(recognize_by_prefix(barcode))
    }
}
