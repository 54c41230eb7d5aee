//! Rule-based field extractors for Taiwan e-invoices.

pub mod amounts;
pub mod dates;
pub mod layout;
pub mod parties;
pub mod patterns;

pub use amounts::{default_tax, extract_tax_amount, extract_total_amount, hex_cents, parse_amount};
pub use dates::{extract_invoice_date, parse_date_text, roc_to_gregorian};
pub use layout::PositionalLayout;
pub use parties::{extract_parties, Parties};
pub use patterns::*;

use regex::Regex;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Where an extracted value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    /// A labeled line such as `賣方: ...` or `Total: ...`.
    Labeled,
    /// An unlabeled pattern found anywhere in the text.
    Pattern,
    /// A fixed-width field of the left QR code layout.
    Positional,
}

/// Extracted value with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// How the value was found.
    pub origin: FieldOrigin,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, origin: FieldOrigin, source: impl Into<String>) -> Self {
        Self {
            value,
            origin,
            source: source.into(),
        }
    }
}

/// Extractor over an ordered cascade of labeled patterns.
///
/// Each pattern must have the value in capture group 1.
pub struct CascadeExtractor<'a> {
    cascade: &'a [Regex],
    origin: FieldOrigin,
}

impl<'a> CascadeExtractor<'a> {
    pub fn new(cascade: &'a [Regex]) -> Self {
        Self {
            cascade,
            origin: FieldOrigin::Labeled,
        }
    }
}

impl FieldExtractor for CascadeExtractor<'_> {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.cascade.iter().find_map(|re| {
            let caps = re.captures(text)?;
            let value = caps.get(1)?.as_str();
            Some(ExtractionMatch::new(value.to_string(), self.origin, &caps[0]))
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.cascade
            .iter()
            .flat_map(|re| re.captures_iter(text))
            .filter_map(|caps| {
                let value = caps.get(1)?.as_str();
                Some(ExtractionMatch::new(value.to_string(), self.origin, &caps[0]))
            })
            .collect()
    }
}
