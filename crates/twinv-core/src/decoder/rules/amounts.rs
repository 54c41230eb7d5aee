//! Amount extraction for Taiwan e-invoices.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::layout::PositionalLayout;
use super::patterns::{TAX_AMOUNT, TOTAL_AMOUNT};
use super::{CascadeExtractor, ExtractionMatch, FieldExtractor, FieldOrigin};

/// Business tax rate used when the payload carries no tax amount.
pub const BUSINESS_TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Parse an unsigned decimal such as `150`, `12.5` or `150.`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim().trim_end_matches('.');
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s).ok()
}

/// Parse an 8-hex-digit amount field expressed in cents.
pub fn hex_cents(hex: &str) -> Option<Decimal> {
    let cents = u32::from_str_radix(hex, 16).ok()?;
    Some(Decimal::new(i64::from(cents), 2))
}

/// Tax computed at the business tax rate, rounded to whole NTD.
pub fn default_tax(total: Decimal) -> Decimal {
    (total * BUSINESS_TAX_RATE).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Extract the total amount: labeled or currency text first, then the
/// positional total field.
pub fn extract_total_amount(
    text: &str,
    layout: Option<&PositionalLayout>,
) -> Option<ExtractionMatch<Decimal>> {
    let labeled = CascadeExtractor::new(&TOTAL_AMOUNT)
        .extract(text)
        .and_then(|m| {
            let value = parse_amount(&m.value)?;
            Some(ExtractionMatch::new(value, m.origin, m.source))
        });

    labeled.or_else(|| {
        let layout = layout?;
        let total = layout.total_amount()?;
        Some(ExtractionMatch::new(
            total,
            FieldOrigin::Positional,
            layout.total_amount_hex.clone().unwrap_or_default(),
        ))
    })
}

/// Extract a labeled tax amount.
pub fn extract_tax_amount(text: &str) -> Option<ExtractionMatch<Decimal>> {
    let m = CascadeExtractor::new(&TAX_AMOUNT).extract(text)?;
    let value = parse_amount(&m.value)?;
    Some(ExtractionMatch::new(value, m.origin, m.source))
}
