//! Static barcode lookup table.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{BarcodeResolver, ItemRecognition, RecognitionSource};

/// A known barcode and what it identifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeEntry {
    pub barcode: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub confidence: u8,
}

impl BarcodeEntry {
    pub fn to_recognition(&self) -> ItemRecognition {
        ItemRecognition {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            confidence: self.confidence,
            language: None,
            source: RecognitionSource::LookupTable,
        }
    }
}

/// Entries shipped with the default configuration.
pub fn default_entries() -> Vec<BarcodeEntry> {
    let entry = |barcode: &str, name: &str, description: &str, category: &str, sub: &str, confidence| {
        BarcodeEntry {
            barcode: barcode.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            subcategory: Some(sub.to_string()),
            confidence,
        }
    };

    vec![
        // 471: Taiwan
        entry(
            "4710901898748",
            "Taiwan Pure Water Wet Wipes",
            "Taiwan-made pure water wet wipes with ultra-high filtration, no fluorescent agents, no harmful chemicals. Safe for babies and household use.",
            "Personal Care",
            "Wet Wipes",
            95,
        ),
        entry(
            "7622300761349",
            "Mini Oreo Original Cookies",
            "Mini Oreo Original Cookies - bite-sized chocolate cookies with vanilla cream filling. Perfect for snacking.",
            "Food & Beverages",
            "Cookies",
            95,
        ),
        entry(
            "0123456789012",
            "Generic Consumer Product",
            "Standard EAN-13 consumer product. Please verify product details manually.",
            "Miscellaneous",
            "General",
            60,
        ),
    ]
}

/// Read-only barcode table, keyed by barcode text.
#[derive(Debug, Clone, Default)]
pub struct BarcodeTable {
    entries: HashMap<String, BarcodeEntry>,
}

impl BarcodeTable {
    /// Build a table; later entries replace earlier ones with the same barcode.
    pub fn new(entries: impl IntoIterator<Item = BarcodeEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.barcode.clone(), e))
                .collect(),
        }
    }

    pub fn get(&self, barcode: &str) -> Option<&BarcodeEntry> {
        self.entries.get(barcode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolver backed by a [`BarcodeTable`].
#[derive(Debug, Clone)]
pub struct LookupTableResolver {
    table: BarcodeTable,
}

impl LookupTableResolver {
    pub fn new(table: BarcodeTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl BarcodeResolver for LookupTableResolver {
    fn name(&self) -> &'static str {
        "lookup-table"
    }

    async fn try_resolve(&self, barcode: &str) -> Option<ItemRecognition> {
        self.table.get(barcode).map(BarcodeEntry::to_recognition)
    }
}
