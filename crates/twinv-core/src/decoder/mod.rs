//! Taiwan e-invoice decoding.

pub mod classifier;
pub mod clock;
pub mod items;
pub mod parser;
pub mod payload;
pub mod receipt;
pub mod rules;

pub use classifier::is_taiwan_einvoice;
pub use clock::{Clock, FixedClock, SystemClock};
pub use items::parse_items_from_data;
pub use parser::TaiwanInvoiceDecoder;

use crate::models::invoice::{ReceiptCodes, TaiwanInvoice, TaiwanReceipt};

/// Decode one QR payload with the system clock.
pub fn decode_taiwan_einvoice(qr_data: &str) -> TaiwanInvoice {
    TaiwanInvoiceDecoder::new().decode(qr_data)
}

/// Decode a two-QR receipt with the system clock.
pub fn decode_taiwan_receipt(codes: &ReceiptCodes) -> TaiwanReceipt {
    TaiwanInvoiceDecoder::new().decode_receipt(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_free_functions() {
        let invoice = decode_taiwan_einvoice("發票號碼: ZZ00000001\n總金額: 200");
        assert!(invoice.is_valid);
        assert_eq!(invoice.invoice_number, "ZZ00000001");
        assert_eq!(invoice.total_amount, Decimal::from(200));
        assert_eq!(invoice.tax_amount, Decimal::from(10));

        let receipt = decode_taiwan_receipt(&ReceiptCodes::default());
        assert!(!receipt.invoice.is_valid);
    }

    #[test]
    fn test_classifier_then_decode() {
        let text = "賣方: 鼎泰豐\n小籠包 1 250 250";
        assert!(is_taiwan_einvoice(text, None));

        let invoice = decode_taiwan_einvoice(text);
        assert_eq!(invoice.seller_name, "鼎泰豐");
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].name, "小籠包");
    }
}
