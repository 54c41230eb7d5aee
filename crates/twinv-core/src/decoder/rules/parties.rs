//! Seller and buyer extraction.

use super::layout::PositionalLayout;
use super::patterns::{BUYER_NAME, BUYER_TAX_ID, SELLER_NAME, SELLER_TAX_ID};
use super::{CascadeExtractor, ExtractionMatch, FieldExtractor, FieldOrigin};

/// Seller and buyer identity found in a payload.
#[derive(Debug, Clone, Default)]
pub struct Parties {
    pub seller_name: Option<ExtractionMatch<String>>,
    pub seller_tax_id: Option<ExtractionMatch<String>>,
    pub buyer_name: Option<ExtractionMatch<String>>,
    pub buyer_tax_id: Option<ExtractionMatch<String>>,
}

/// Extract party names and tax IDs.
///
/// Names come from labeled lines only. Tax IDs missing from the text are
/// back-filled from the positional buyer/seller identifiers.
pub fn extract_parties(text: &str, layout: Option<&PositionalLayout>) -> Parties {
    let trimmed = |m: ExtractionMatch<String>| {
        let value = m.value.trim().to_string();
        ExtractionMatch::new(value, m.origin, m.source)
    };

    let mut parties = Parties {
        seller_name: CascadeExtractor::new(&SELLER_NAME).extract(text).map(trimmed),
        seller_tax_id: CascadeExtractor::new(&SELLER_TAX_ID).extract(text),
        buyer_name: CascadeExtractor::new(&BUYER_NAME).extract(text).map(trimmed),
        buyer_tax_id: CascadeExtractor::new(&BUYER_TAX_ID).extract(text),
    };

    if let Some(layout) = layout {
        if parties.buyer_tax_id.is_none() {
            parties.buyer_tax_id = layout
                .buyer_tax_id()
                .map(|id| ExtractionMatch::new(id.to_string(), FieldOrigin::Positional, id));
        }
        if parties.seller_tax_id.is_none() {
            parties.seller_tax_id = layout
                .seller_tax_id()
                .map(|id| ExtractionMatch::new(id.to_string(), FieldOrigin::Positional, id));
        }
    }

    parties
}
