//! Fixed-width layout of the left e-invoice QR code.
//!
//! ```text
//! [invoice number 10][ROC date 7][random 4][sales 8 hex][total 8 hex][buyer 8][seller 8][AES 24]
//! ```
//!
//! Not every issuer follows this layout; each field is read only when every
//! preceding field is present and well-formed.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::amounts::hex_cents;
use super::dates::roc_to_gregorian;
use super::patterns::POSITIONAL_LAYOUT;

/// Identifier printed when the buyer or seller is not registered.
const EMPTY_IDENTIFIER: &str = "00000000";

/// Upper bound (exclusive) for a plausible positional total, in NTD.
const MAX_POSITIONAL_TOTAL: i64 = 100_000;

/// Fields read from the fixed-width prefix of a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalLayout {
    pub invoice_number: String,
    pub roc_date: Option<String>,
    pub random_code: Option<String>,
    pub sales_amount_hex: Option<String>,
    pub total_amount_hex: Option<String>,
    pub buyer_identifier: Option<String>,
    pub seller_identifier: Option<String>,
}

impl PositionalLayout {
    /// Read the layout; `None` unless the text starts with an invoice number.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = POSITIONAL_LAYOUT.captures(text)?;
        let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        Some(Self {
            invoice_number: caps[1].to_string(),
            roc_date: field(2),
            random_code: field(3),
            sales_amount_hex: field(4),
            total_amount_hex: field(5),
            buyer_identifier: field(6),
            seller_identifier: field(7),
        })
    }

    /// Invoice date converted from the ROC calendar.
    pub fn invoice_date(&self) -> Option<NaiveDate> {
        self.roc_date.as_deref().and_then(roc_to_gregorian)
    }

    /// Total amount: hex cents / 100, accepted only inside (0, 100000) NTD.
    pub fn total_amount(&self) -> Option<Decimal> {
        self.total_amount_hex
            .as_deref()
            .and_then(hex_cents)
            .filter(|amount| *amount > Decimal::ZERO && *amount < Decimal::from(MAX_POSITIONAL_TOTAL))
    }

    /// Sales amount (before tax): hex cents / 100.
    pub fn sales_amount(&self) -> Option<Decimal> {
        self.sales_amount_hex.as_deref().and_then(hex_cents)
    }

    /// Buyer unified business number, unless unregistered.
    pub fn buyer_tax_id(&self) -> Option<&str> {
        self.buyer_identifier
            .as_deref()
            .filter(|id| *id != EMPTY_IDENTIFIER)
    }

    /// Seller unified business number, unless unregistered.
    pub fn seller_tax_id(&self) -> Option<&str> {
        self.seller_identifier
            .as_deref()
            .filter(|id| *id != EMPTY_IDENTIFIER)
    }
}
