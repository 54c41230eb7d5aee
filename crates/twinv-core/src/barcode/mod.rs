//! Barcode recognition chain.
//!
//! A scanned barcode is offered to an ordered list of [`BarcodeResolver`]s.
//! The first resolver that recognizes it wins. The default chain ends with
//! the GS1 prefix heuristic, so [`RecognitionChain::resolve`] always yields
//! a result.

pub mod einvoice;
pub mod format;
pub mod heuristic;
pub mod image;
pub mod model;
pub mod prompt;
pub mod table;

#[cfg(feature = "native")]
pub mod chat;
#[cfg(feature = "native")]
pub mod openfoodfacts;
#[cfg(feature = "native")]
pub mod warehouse;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RecognitionError;
use crate::models::config::TwinvConfig;

pub use einvoice::EInvoiceResolver;
pub use format::{detect_barcode_format, BarcodeFormat};
pub use heuristic::PrefixHeuristicResolver;
pub use image::{ImageRecognizer, ProductImage};
pub use model::{ModelResolver, ProductModel};
pub use table::{BarcodeEntry, BarcodeTable, LookupTableResolver};

/// What a barcode was recognized as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecognition {
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Heuristic confidence, 0-100.
    pub confidence: u8,
    /// Language of the recognized text, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub source: RecognitionSource,
}

/// Which stage produced a recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionSource {
    EInvoice,
    Warehouse,
    LookupTable,
    OpenFoodFacts,
    Model,
    Image,
    Heuristic,
}

impl std::fmt::Display for RecognitionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecognitionSource::EInvoice => "e-invoice",
            RecognitionSource::Warehouse => "warehouse",
            RecognitionSource::LookupTable => "lookup table",
            RecognitionSource::OpenFoodFacts => "OpenFoodFacts",
            RecognitionSource::Model => "model",
            RecognitionSource::Image => "image",
            RecognitionSource::Heuristic => "heuristic",
        };
        write!(f, "{}", s)
    }
}

/// One strategy of the recognition chain.
#[async_trait]
pub trait BarcodeResolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Recognize `barcode`, or `None` to pass it to the next resolver.
    ///
    /// Transport and parse failures are logged and reported as `None`.
    async fn try_resolve(&self, barcode: &str) -> Option<ItemRecognition>;
}

/// Persistent store for recognized barcodes.
#[async_trait]
pub trait BarcodeStore: Send + Sync {
    async fn save(&self, barcode: &str, recognition: &ItemRecognition) -> Result<(), RecognitionError>;
}

/// Ordered list of resolvers, tried until one succeeds.
#[derive(Default)]
pub struct RecognitionChain {
    resolvers: Vec<Box<dyn BarcodeResolver>>,
}

impl RecognitionChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver.
    pub fn with_resolver(mut self, resolver: impl BarcodeResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Append a boxed resolver.
    pub fn push(&mut self, resolver: Box<dyn BarcodeResolver>) {
        self.resolvers.push(resolver);
    }

    /// Resolver names in order.
    pub fn resolver_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Run the resolvers in order; `None` if none recognized the barcode.
    pub async fn try_resolve(&self, barcode: &str) -> Option<ItemRecognition> {
        debug!(
            "Processing barcode {} (format: {})",
            barcode,
            detect_barcode_format(barcode)
        );

        for resolver in &self.resolvers {
            if let Some(found) = resolver.try_resolve(barcode).await {
                info!(
                    "Barcode {} resolved by {}: {} ({}%)",
                    barcode,
                    resolver.name(),
                    found.name,
                    found.confidence
                );
                return Some(found);
            }
            debug!("{} did not resolve {}", resolver.name(), barcode);
        }

        None
    }

    /// Run the chain, falling back to the prefix heuristic when nothing resolves.
    pub async fn resolve(&self, barcode: &str) -> ItemRecognition {
        match self.try_resolve(barcode).await {
            Some(found) => found,
            None => heuristic::recognize_by_prefix(barcode),
        }
    }

    /// Build the default chain from configuration.
    ///
    /// Order: e-invoice, warehouse, lookup table, OpenFoodFacts, model,
    /// prefix heuristic. Network stages are included only when configured.
    #[cfg(feature = "native")]
    pub fn from_config(config: &TwinvConfig) -> crate::Result<Self> {
        use std::sync::Arc;
        use std::time::Duration;

        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.recognition.timeout_secs))
            .build()
            .map_err(RecognitionError::from)?;

        let warehouse = config
            .recognition
            .warehouse_url
            .as_deref()
            .map(|url| Arc::new(warehouse::WarehouseClient::new(client.clone(), url)));

        let mut chain = Self::new().with_resolver(EInvoiceResolver::new(&config.decoder.user_language));

        if let Some(warehouse) = &warehouse {
            chain.push(Box::new(warehouse::WarehouseResolver::new(warehouse.clone())));
        }

        chain.push(Box::new(LookupTableResolver::new(BarcodeTable::new(
            config.recognition.lookup_table.clone(),
        ))));

        if config.recognition.use_openfoodfacts {
            chain.push(Box::new(openfoodfacts::OpenFoodFactsResolver::new(
                client.clone(),
                &config.recognition.openfoodfacts_url,
            )));
        }

        match chat::ChatCompletionsModel::from_config(client, &config.model) {
            Ok(model) => {
                let mut resolver = ModelResolver::new(model, &config.decoder.user_language)
                    .with_save_threshold(config.recognition.save_threshold);
                if let Some(warehouse) = warehouse {
                    resolver = resolver.with_store(warehouse);
                }
                chain.push(Box::new(resolver));
            }
            Err(e) => info!("Skipping model recognition: {}", e),
        }

        Ok(chain.with_resolver(PrefixHeuristicResolver))
    }

    /// Build the default chain from configuration.
    ///
    /// Without network support this is the [`offline`](Self::offline) chain.
    #[cfg(not(feature = "native"))]
    pub fn from_config(config: &TwinvConfig) -> crate::Result<Self> {
        Ok(Self::offline(config))
    }

    /// Chain without network stages: e-invoice, lookup table, prefix heuristic.
    pub fn offline(config: &TwinvConfig) -> Self {
        Self::new()
            .with_resolver(EInvoiceResolver::new(&config.decoder.user_language))
            .with_resolver(LookupTableResolver::new(BarcodeTable::new(
                config.recognition.lookup_table.clone(),
            )))
            .with_resolver(PrefixHeuristicResolver)
    }
}

impl std::fmt::Debug for RecognitionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionChain")
            .field("resolvers", &self.resolver_names())
            .finish()
    }
}
