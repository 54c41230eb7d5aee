//! Heuristic gate deciding whether scanned data looks like a Taiwan e-invoice.
//!
//! This is not a format validator. In lenient mode (`zh-TW` users) almost
//! everything passes.

use super::rules::patterns::{CJK, CURRENCY, DATE_OR_EIGHT_DIGITS, INVOICE_NUMBER};

/// Language code that switches the classifier into lenient mode.
pub const LENIENT_LANGUAGE: &str = "zh-TW";

/// Minimum length (in characters) in strict mode.
const MIN_STRICT_LEN: usize = 5;

/// Markers of other QR payload kinds (URLs, vCard, WiFi, SMS, tel, mailto).
const NON_INVOICE_MARKERS: &[&str] = &[
    "http://", "https://", "www.", ".com", ".org", ".net",
    "begin:", "end:", "vcard", "wifi:", "sms:", "tel:", "mailto:",
];

/// Keywords indicating a Taiwan invoice.
const INVOICE_INDICATORS: &[&str] = &[
    "發票", "invoice", "統編", "tax id",
    "賣方", "seller", "買方", "buyer",
    "總金額", "total", "稅額", "tax",
    "台灣", "taiwan", "電子發票", "electronic invoice",
    "店名", "商店", "消費者", "金額",
];

/// Check whether `qr_data` is likely a Taiwan e-invoice.
///
/// `user_language` defaults to `en`.
pub fn is_taiwan_einvoice(qr_data: &str, user_language: Option<&str>) -> bool {
    if qr_data.trim().is_empty() {
        return false;
    }

    let lower = qr_data.to_lowercase();

    if user_language == Some(LENIENT_LANGUAGE) {
        return !NON_INVOICE_MARKERS.iter().any(|m| lower.contains(m));
    }

    if qr_data.chars().count() < MIN_STRICT_LEN {
        return false;
    }

    let has_indicator = INVOICE_INDICATORS.iter().any(|k| lower.contains(k));
    let has_invoice_number = INVOICE_NUMBER.is_match(qr_data);
    let has_date = DATE_OR_EIGHT_DIGITS.is_match(qr_data);
    let has_cjk = CJK.is_match(qr_data);
    let has_currency = CURRENCY.is_match(qr_data);

    has_indicator || (has_invoice_number && has_date) || (has_cjk && (has_date || has_currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_rejected_in_both_modes() {
        assert!(!is_taiwan_einvoice("https://example.com", Some("en")));
        assert!(!is_taiwan_einvoice("https://example.com", Some("zh-TW")));
    }

    #[test]
    fn test_lenient_mode_accepts_cjk_text() {
        assert!(is_taiwan_einvoice("隨便文字", Some("zh-TW")));
        assert!(!is_taiwan_einvoice("隨便文字", Some("en")));
    }

    #[test]
    fn test_lenient_mode_rejects_other_payloads() {
        assert!(!is_taiwan_einvoice("BEGIN:VCARD\nFN:王小明\nEND:VCARD", Some("zh-TW")));
        assert!(!is_taiwan_einvoice("WIFI:S:home;T:WPA;P:secret;;", Some("zh-TW")));
        assert!(!is_taiwan_einvoice("MAILTO:someone@example.tw", Some("zh-TW")));
        assert!(!is_taiwan_einvoice("   ", Some("zh-TW")));
    }

    #[test]
    fn test_invoice_number_and_date() {
        assert!(is_taiwan_einvoice("AB12345678 2024-01-01", Some("en")));
        assert!(is_taiwan_einvoice("AB12345678 2024-01-01", None));
        assert!(!is_taiwan_einvoice("AB1234 99", None));
    }

    #[test]
    fn test_indicator_keywords() {
        assert!(is_taiwan_einvoice("TOTAL: 150", None));
        assert!(is_taiwan_einvoice("統一發票兌獎", None));
        assert!(!is_taiwan_einvoice("hello world", None));
    }

    #[test]
    fn test_cjk_with_currency() {
        assert!(is_taiwan_einvoice("牛肉麵 150元", None));
        assert!(!is_taiwan_einvoice("牛肉麵大碗", None));
    }

    #[test]
    fn test_short_input_rejected_in_strict_mode() {
        assert!(!is_taiwan_einvoice("tax", None));
    }
}
