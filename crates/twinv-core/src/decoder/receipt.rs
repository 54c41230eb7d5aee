//! Two-QR receipt assembly.

use tracing::{debug, info};

use crate::error::DecodeError;
use crate::models::invoice::{ReceiptCodes, TaiwanInvoice, TaiwanReceipt};

use super::parser::TaiwanInvoiceDecoder;

impl TaiwanInvoiceDecoder {
    /// Decode both QR codes of a paper receipt and keep the better record.
    ///
    /// Preference: valid left, valid right, left, right. When neither code
    /// is present the invoice is the `No valid QR codes found` error record.
    /// The barcode is carried through but never decoded.
    pub fn decode_receipt(&self, codes: &ReceiptCodes) -> TaiwanReceipt {
        let decode_side = |side: &str, code: Option<&String>| {
            let code = code.filter(|c| !c.is_empty())?;
            debug!("Decoding {} QR code ({} characters)", side, code.len());
            Some(self.decode(code))
        };

        let left = decode_side("left", codes.left_qr_code.as_ref());
        let right = decode_side("right", codes.right_qr_code.as_ref());

        let invoice = select_invoice(left, right);
        info!(
            "Receipt decoded: invoice {:?}, valid {}",
            invoice.invoice_number, invoice.is_valid
        );

        TaiwanReceipt::new(codes, invoice)
    }
}

fn select_invoice(left: Option<TaiwanInvoice>, right: Option<TaiwanInvoice>) -> TaiwanInvoice {
    match (left, right) {
        (Some(l), _) if l.is_valid => l,
        (_, Some(r)) if r.is_valid => r,
        (Some(l), _) => l,
        (None, Some(r)) => r,
        (None, None) => TaiwanInvoice::error_result(&DecodeError::NoQrCodes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const LEFT_QR: &str =
        "AB1234567811301051234000004B0000004EC0000000012345675ABCDEFGHIJKLMNOPQRSTUVWX";

    fn decoder() -> TaiwanInvoiceDecoder {
        TaiwanInvoiceDecoder::new()
            .with_clock(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()))
    }

    fn codes(left: Option<&str>, right: Option<&str>, barcode: Option<&str>) -> ReceiptCodes {
        ReceiptCodes {
            left_qr_code: left.map(str::to_string),
            right_qr_code: right.map(str::to_string),
            barcode: barcode.map(str::to_string),
        }
    }

    #[test]
    fn test_left_valid_right_invalid() {
        let receipt = decoder().decode_receipt(&codes(Some(LEFT_QR), Some("   "), Some("11401AB12345678")));

        assert!(receipt.invoice.is_valid);
        assert_eq!(receipt.invoice.invoice_number, "AB12345678");
        assert_eq!(receipt.left_qr_code, LEFT_QR);
        assert_eq!(receipt.right_qr_code, "   ");
        assert_eq!(receipt.barcode, "11401AB12345678");
        assert_eq!(receipt.invoice.left_qr_code.as_deref(), Some(LEFT_QR));
        assert_eq!(receipt.invoice.barcode.as_deref(), Some("11401AB12345678"));
    }

    #[test]
    fn test_right_used_when_left_invalid() {
        let receipt = decoder().decode_receipt(&codes(Some(" "), Some("**:Total: 80"), None));

        assert!(receipt.invoice.is_valid);
        assert_eq!(receipt.invoice.total_amount, rust_decimal::Decimal::from(80));
        assert_eq!(receipt.barcode, "");
    }

    #[test]
    fn test_left_error_kept_when_both_invalid() {
        let receipt = decoder().decode_receipt(&codes(Some(" "), Some("\t"), None));

        assert!(!receipt.invoice.is_valid);
        assert_eq!(receipt.invoice.error.as_deref(), Some("Empty QR code data"));
    }

    #[test]
    fn test_no_codes() {
        let receipt = decoder().decode_receipt(&codes(None, Some(""), Some("11401AB12345678")));

        assert!(!receipt.invoice.is_valid);
        assert_eq!(receipt.invoice.error.as_deref(), Some("No valid QR codes found"));
        assert_eq!(receipt.left_qr_code, "");
        assert_eq!(receipt.barcode, "11401AB12345678");
    }
}
