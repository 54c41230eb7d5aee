//! Taiwan e-invoice decoder combining labeled and positional extraction.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::DecodeError;
use crate::models::invoice::{InvoiceField, TaiwanInvoice};

use super::clock::{Clock, SystemClock};
use super::items::{extract_line_items, ItemFallback};
use super::payload::decode_payload;
use super::rules::{
    default_tax, extract_invoice_date, extract_parties, extract_tax_amount, extract_total_amount,
    patterns::{first_capture, INVOICE_NUMBER, INVOICE_NUMBER_LABELED, INVOICE_NUMBER_LEADING},
    PositionalLayout,
};

/// Seller name used when the payload names no seller.
pub const DEFAULT_SELLER_NAME: &str = "台灣商店";

/// Prefix of generated invoice numbers.
const PLACEHOLDER_PREFIX: &str = "QR_";

/// Digits of the millisecond timestamp kept in a generated invoice number.
const PLACEHOLDER_DIGITS: usize = 8;

/// Decoder for Taiwan e-invoice QR payloads.
#[derive(Clone)]
pub struct TaiwanInvoiceDecoder {
    clock: Arc<dyn Clock>,
}

impl TaiwanInvoiceDecoder {
    /// Create a decoder using the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for the default date and generated invoice numbers.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Decode a scanned payload.
    ///
    /// Hard failures produce a record with `is_valid = false` and `error` set;
    /// every other input yields a valid record with defaults for whatever
    /// could not be extracted.
    pub fn decode(&self, qr_data: &str) -> TaiwanInvoice {
        self.try_decode(qr_data).unwrap_or_else(|e| {
            warn!("Failed to decode e-invoice: {}", e);
            TaiwanInvoice::error_result(&e)
        })
    }

    /// Decode a scanned payload, returning hard failures as errors.
    pub fn try_decode(&self, qr_data: &str) -> Result<TaiwanInvoice, DecodeError> {
        if qr_data.trim().is_empty() {
            return Err(DecodeError::Empty);
        }

        let text = decode_payload(qr_data);
        self.parse(&text)
    }

    /// Extract invoice fields from already-decoded text.
    pub fn parse(&self, text: &str) -> Result<TaiwanInvoice, DecodeError> {
        if text.lines().all(|l| l.trim().is_empty()) {
            return Err(DecodeError::NoData);
        }

        info!("Parsing e-invoice from {} characters of text", text.len());

        let mut defaulted = Vec::new();
        let layout = PositionalLayout::parse(text);

        let invoice_number = self.extract_invoice_number(text).unwrap_or_else(|| {
            defaulted.push(InvoiceField::InvoiceNumber);
            self.placeholder_number()
        });

        let invoice_date = match extract_invoice_date(text, layout.as_ref()) {
            Some(found) => found.value,
            None => {
                defaulted.push(InvoiceField::InvoiceDate);
                self.clock.now().date_naive()
            }
        };

        let parties = extract_parties(text, layout.as_ref());
        let seller_name = parties.seller_name.map(|m| m.value);
        if seller_name.is_none() {
            defaulted.push(InvoiceField::SellerName);
        }
        let seller_tax_id = parties.seller_tax_id.map(|m| m.value).unwrap_or_else(|| {
            defaulted.push(InvoiceField::SellerTaxId);
            String::new()
        });

        let total_amount = extract_total_amount(text, layout.as_ref()).map(|m| m.value);
        if total_amount.is_none() {
            defaulted.push(InvoiceField::TotalAmount);
        }
        let total = total_amount.unwrap_or(Decimal::ZERO);

        let tax_amount = extract_tax_amount(text).map(|m| m.value).unwrap_or_else(|| {
            defaulted.push(InvoiceField::TaxAmount);
            default_tax(total)
        });

        // Only `賣方`/`Seller` labels name the fallback item, not the wider seller cascade
        let parsed_items = extract_line_items(
            text,
            ItemFallback {
                total_amount,
                ..ItemFallback::from_text(text)
            },
        );
        if parsed_items.synthetic {
            defaulted.push(InvoiceField::Items);
        }

        let invoice = TaiwanInvoice {
            invoice_number,
            invoice_date: Some(invoice_date),
            seller_name: seller_name.unwrap_or_else(|| DEFAULT_SELLER_NAME.to_string()),
            seller_tax_id,
            buyer_name: parties.buyer_name.map(|m| m.value),
            buyer_tax_id: parties.buyer_tax_id.map(|m| m.value),
            total_amount: total,
            tax_amount,
            items: parsed_items.items,
            left_qr_code: None,
            right_qr_code: None,
            barcode: None,
            is_valid: true,
            error: None,
            defaulted_fields: defaulted,
        };

        debug!(
            "Decoded e-invoice {} ({}) seller {:?} total {} with {} items, completeness {:.2}",
            invoice.invoice_number,
            invoice.invoice_date_string(),
            invoice.seller_name,
            invoice.total_amount,
            invoice.items.len(),
            invoice.completeness()
        );

        Ok(invoice)
    }

    fn extract_invoice_number(&self, text: &str) -> Option<String> {
        // Try labeled pattern first
        if let Some(number) = first_capture(&INVOICE_NUMBER_LABELED, text) {
            return Some(number.to_string());
        }

        // Then the leading field of the QR layout, then anywhere
        INVOICE_NUMBER_LEADING
            .captures(text)
            .or_else(|| INVOICE_NUMBER.captures(text))
            .map(|caps| caps[1].to_string())
    }

    fn placeholder_number(&self) -> String {
        let millis = self.clock.now().timestamp_millis().to_string();
        let suffix = &millis[millis.len().saturating_sub(PLACEHOLDER_DIGITS)..];
        format!("{}{}", PLACEHOLDER_PREFIX, suffix)
    }
}

impl Default for TaiwanInvoiceDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaiwanInvoiceDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaiwanInvoiceDecoder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::clock::FixedClock;
    use crate::decoder::items::{parse_items_from_data, GENERIC_ITEM_NAME, GENERIC_PURCHASE_NAME};
    use crate::models::invoice::LineItem;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn decoder() -> TaiwanInvoiceDecoder {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        TaiwanInvoiceDecoder::new().with_clock(FixedClock(now))
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_empty_input_is_hard_error() {
        for input in ["", "   ", "\n\t"] {
            let invoice = decoder().decode(input);

            assert!(!invoice.is_valid);
            assert_eq!(invoice.error.as_deref(), Some("Empty QR code data"));
            assert_eq!(invoice.invoice_number, "");
            assert_eq!(invoice.seller_name, "");
            assert_eq!(invoice.seller_tax_id, "");
            assert_eq!(invoice.total_amount, Decimal::ZERO);
            assert_eq!(invoice.tax_amount, Decimal::ZERO);
            assert!(invoice.items.is_empty());
        }
        assert_eq!(decoder().try_decode(" "), Err(DecodeError::Empty));
    }

    #[test]
    fn test_labeled_text_invoice() {
        let text = "電子發票證明聯\n\
                    發票號碼: CD87654321\n\
                    發票日期: 2024/02/29\n\
                    賣方: 全家便利商店\n\
                    賣方統編: 16606102\n\
                    買方統編: 12345675\n\
                    拿鐵咖啡 1 55 55\n\
                    總金額: 55\n\
                    稅額: 3";
        let invoice = decoder().decode(text);

        assert!(invoice.is_valid);
        assert_eq!(invoice.invoice_number, "CD87654321");
        assert_eq!(invoice.invoice_date, ymd(2024, 2, 29));
        assert_eq!(invoice.seller_name, "全家便利商店");
        assert_eq!(invoice.seller_tax_id, "16606102");
        assert_eq!(invoice.buyer_tax_id.as_deref(), Some("12345675"));
        assert_eq!(invoice.buyer_name, None);
        assert_eq!(invoice.total_amount, Decimal::from(55));
        assert_eq!(invoice.tax_amount, Decimal::from(3));
        assert_eq!(
            invoice.items,
            vec![LineItem::new("拿鐵咖啡", Decimal::ONE, Decimal::from(55), Decimal::from(55))]
        );
        assert!(invoice.defaulted_fields.is_empty());
        assert_eq!(invoice.completeness(), 1.0);
    }

    #[test]
    fn test_positional_left_qr() {
        // [AB12345678][1130105][1234][sales 000004B0][total 000004EC][buyer 00000000][seller 12345675][AES]
        let qr = "AB1234567811301051234000004B0000004EC0000000012345675ABCDEFGHIJKLMNOPQRSTUVWX";
        let invoice = decoder().decode(qr);

        assert!(invoice.is_valid);
        assert_eq!(invoice.invoice_number, "AB12345678");
        assert_eq!(invoice.invoice_date, ymd(2024, 1, 5));
        assert_eq!(invoice.total_amount, Decimal::new(1260, 2));
        assert_eq!(invoice.tax_amount, Decimal::ONE);
        assert_eq!(invoice.seller_tax_id, "12345675");
        assert_eq!(invoice.buyer_tax_id, None);
        assert_eq!(invoice.seller_name, DEFAULT_SELLER_NAME);
        assert_eq!(
            invoice.defaulted_fields,
            vec![InvoiceField::SellerName, InvoiceField::TaxAmount, InvoiceField::Items]
        );
        assert_eq!(invoice.items, vec![LineItem::single("台灣商品購買", Decimal::new(1260, 2))]);
    }

    #[test]
    fn test_base64_payload() {
        let encoded = STANDARD.encode("Invoice: XY11112222\nDate: 2024-06-01\nSeller: 7-ELEVEN\nTotal: 150");
        let invoice = decoder().decode(&encoded);

        assert_eq!(invoice.invoice_number, "XY11112222");
        assert_eq!(invoice.invoice_date, ymd(2024, 6, 1));
        assert_eq!(invoice.seller_name, "7-ELEVEN");
        assert_eq!(invoice.total_amount, Decimal::from(150));
        assert_eq!(invoice.tax_amount, Decimal::from(8));
        assert_eq!(invoice.items, vec![LineItem::single("來自 7-ELEVEN 的商品", Decimal::from(150))]);
    }

    #[test]
    fn test_store_label_does_not_name_fallback_item() {
        let text = "店名: 全聯\nTotal: 150";
        let invoice = decoder().decode(text);

        assert_eq!(invoice.seller_name, "全聯");
        assert_eq!(invoice.items, vec![LineItem::single(GENERIC_PURCHASE_NAME, Decimal::from(150))]);
        assert_eq!(invoice.items, parse_items_from_data(text));
    }

    #[test]
    fn test_overflowing_item_line_does_not_panic() {
        let invoice =
            decoder().decode("發票號碼: AB12345678\nWidget 99999999999999999999 99999999999999999999 0");

        assert!(invoice.is_valid);
        assert_eq!(invoice.invoice_number, "AB12345678");
        assert_eq!(invoice.items, vec![LineItem::single(GENERIC_ITEM_NAME, Decimal::ZERO)]);
        assert!(invoice.is_defaulted(InvoiceField::Items));
    }

    #[test]
    fn test_defaults_use_injected_clock() {
        let invoice = decoder().decode("隨便文字");

        assert!(invoice.is_valid);
        // 2025-03-14T09:26:53Z = 1741944413000 ms
        assert_eq!(invoice.invoice_number, "QR_44413000");
        assert_eq!(invoice.invoice_date, ymd(2025, 3, 14));
        assert_eq!(invoice.seller_name, DEFAULT_SELLER_NAME);
        assert_eq!(invoice.seller_tax_id, "");
        assert_eq!(invoice.total_amount, Decimal::ZERO);
        assert_eq!(invoice.tax_amount, Decimal::ZERO);
        assert!(invoice.is_defaulted(InvoiceField::InvoiceNumber));
        assert!(invoice.is_defaulted(InvoiceField::InvoiceDate));
    }

    #[test]
    fn test_decode_is_idempotent_with_fixed_clock() {
        let qr = "Seller: 好市多\nTotal: 150\n牛奶 2 90 180";
        assert_eq!(decoder().decode(qr), decoder().decode(qr));
    }

    #[test]
    fn test_invalid_roc_date_falls_back_to_today() {
        let invoice = decoder().decode("AB123456781139999");

        assert_eq!(invoice.invoice_number, "AB12345678");
        assert_eq!(invoice.invoice_date, ymd(2025, 3, 14));
        assert!(invoice.is_defaulted(InvoiceField::InvoiceDate));
    }
}
