//! Common regex patterns for Taiwan e-invoice extraction.
//!
//! Cascades are ordered: the first pattern that matches wins.

use lazy_static::lazy_static;
use regex::Regex;

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

lazy_static! {
    // Invoice number (發票號碼): two uppercase letters + eight digits
    pub static ref INVOICE_NUMBER_LABELED: Vec<Regex> = compile_all(&[
        r"(?i)發票號碼[：:]\s*([A-Z0-9]+)",
        r"(?i)Invoice[：:]\s*([A-Z0-9]+)",
    ]);

    pub static ref INVOICE_NUMBER_LEADING: Regex = Regex::new(
        r"^([A-Z]{2}[0-9]{8})"
    ).unwrap();

    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"([A-Z]{2}[0-9]{8})"
    ).unwrap();

    pub static ref BARE_INVOICE_NUMBER: Regex = Regex::new(
        r"^[A-Z]{2}[0-9]{8}$"
    ).unwrap();

    // Invoice date (發票日期)
    pub static ref DATE_LABELED: Vec<Regex> = compile_all(&[
        r"(?i)發票日期[：:]\s*([0-9]{4}[-/][0-9]{2}[-/][0-9]{2})",
        r"(?i)Date[：:]\s*([0-9]{4}[-/][0-9]{2}[-/][0-9]{2})",
    ]);

    pub static ref DATE_YMD: Regex = Regex::new(
        r"([0-9]{4})[-/]([0-9]{2})[-/]([0-9]{2})"
    ).unwrap();

    // Parties
    pub static ref SELLER_NAME: Vec<Regex> = compile_all(&[
        r"(?i)賣方[：:]\s*([^\n\r]+)",
        r"(?i)Seller[：:]\s*([^\n\r]+)",
        r"(?i)店名[：:]\s*([^\n\r]+)",
        r"(?i)商店[：:]\s*([^\n\r]+)",
    ]);

    /// Seller labels used when naming a synthetic fallback item.
    pub static ref SELLER_NAME_STRICT: Vec<Regex> = compile_all(&[
        r"(?i)賣方[：:]\s*([^\n\r]+)",
        r"(?i)Seller[：:]\s*([^\n\r]+)",
    ]);

    pub static ref SELLER_TAX_ID: Vec<Regex> = compile_all(&[
        r"(?i)賣方統編[：:]\s*([0-9]+)",
        r"(?i)Seller Tax ID[：:]\s*([0-9]+)",
        r"(?i)統編[：:]\s*([0-9]+)",
        r"(?i)Tax ID[：:]\s*([0-9]+)",
    ]);

    pub static ref BUYER_NAME: Vec<Regex> = compile_all(&[
        r"(?i)買方[：:]\s*([^\n\r]+)",
        r"(?i)Buyer[：:]\s*([^\n\r]+)",
        r"(?i)消費者[：:]\s*([^\n\r]+)",
    ]);

    pub static ref BUYER_TAX_ID: Vec<Regex> = compile_all(&[
        r"(?i)買方統編[：:]\s*([0-9]+)",
        r"(?i)Buyer Tax ID[：:]\s*([0-9]+)",
    ]);

    // Amounts
    pub static ref TOTAL_AMOUNT: Vec<Regex> = compile_all(&[
        r"(?i)總金額[：:]\s*([0-9]+\.?[0-9]*)",
        r"(?i)Total[：:]\s*([0-9]+\.?[0-9]*)",
        r"(?i)Amount[：:]\s*([0-9]+\.?[0-9]*)",
        r"(?i)金額[：:]\s*([0-9]+\.?[0-9]*)",
        r"\$([0-9]+\.?[0-9]*)",
        r"NT\$([0-9]+\.?[0-9]*)",
    ]);

    pub static ref TAX_AMOUNT: Vec<Regex> = compile_all(&[
        r"(?i)稅額[：:]\s*([0-9]+\.?[0-9]*)",
        r"(?i)Tax[：:]\s*([0-9]+\.?[0-9]*)",
        r"(?i)稅[：:]\s*([0-9]+\.?[0-9]*)",
    ]);

    // Positional layout of the left QR code:
    // [number 10][ROC date 7][random 4][sales 8 hex][total 8 hex][buyer 8][seller 8][encrypted...]
    pub static ref POSITIONAL_LAYOUT: Regex = Regex::new(
        r"^([A-Z]{2}[0-9]{8})(?:([0-9]{7})(?:([0-9]{4})([0-9a-fA-F]{8})([0-9a-fA-F]{8})(?:([0-9]{8})([0-9]{8}))?)?)?"
    ).unwrap();

    // Item lines
    pub static ref ITEM_FULL: Regex = Regex::new(
        r"([^0-9\s]+[\s\S]*?)\s+([0-9]+\.?[0-9]*)\s+([0-9]+\.?[0-9]*)\s+([0-9]+\.?[0-9]*)"
    ).unwrap();

    pub static ref ITEM_NAME_AMOUNT: Regex = Regex::new(
        r"([^0-9\s]+[\s\S]*?)\s+([0-9]+\.?[0-9]*)"
    ).unwrap();

    pub static ref ITEM_MIXED_SCRIPT: Regex = Regex::new(
        r"([a-zA-Z\x{4e00}-\x{9fff}\s]+?)\s*([0-9]+\.?[0-9]*)"
    ).unwrap();

    pub static ref ITEM_TEXT_THEN_NUMBER: Regex = Regex::new(
        r"[a-zA-Z\x{4e00}-\x{9fff}].*[0-9]"
    ).unwrap();

    pub static ref ITEM_TEXT_ONLY: Regex = Regex::new(
        r"^[^0-9:]+$"
    ).unwrap();

    // Classifier
    pub static ref CJK: Regex = Regex::new(
        r"[\x{4e00}-\x{9fff}]"
    ).unwrap();

    pub static ref DATE_OR_EIGHT_DIGITS: Regex = Regex::new(
        r"[0-9]{4}[-/][0-9]{2}[-/][0-9]{2}|[0-9]{8}"
    ).unwrap();

    pub static ref CURRENCY: Regex = Regex::new(
        r"\$|元|NT\$"
    ).unwrap();
}

/// Line markers that identify invoice metadata rather than purchased items.
pub const METADATA_LINE_MARKERS: &[&str] = &[
    "發票號碼:", "發票日期:", "賣方:", "買方:", "統編:", "稅額:", "總金額:",
    "Invoice:", "Date:", "Seller:", "Buyer:", "Tax ID:", "Total:",
    "電子發票", "Electronic Invoice",
];

/// Keywords that disqualify a candidate item name.
pub const METADATA_NAME_KEYWORDS: &[&str] = &[
    "發票", "統編", "稅額", "總金額", "賣方", "買方", "日期", "號碼", "電子發票",
];

/// Keywords that mark a line as likely product information.
pub const PRODUCT_KEYWORDS: &[&str] = &["商品", "Item", "品名", "項目", "產品", "Product"];

/// First capture group of the first matching pattern in a cascade.
pub fn first_capture<'t>(cascade: &[Regex], text: &'t str) -> Option<&'t str> {
    cascade
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_order() {
        let text = "賣方統編: 12345678\n統編: 87654321";
        assert_eq!(first_capture(&SELLER_TAX_ID, text), Some("12345678"));

        let text = "Tax ID: 87654321";
        assert_eq!(first_capture(&SELLER_TAX_ID, text), Some("87654321"));
    }

    #[test]
    fn test_fullwidth_colon() {
        assert_eq!(first_capture(&INVOICE_NUMBER_LABELED, "發票號碼：AB12345678"), Some("AB12345678"));
        assert_eq!(first_capture(&TOTAL_AMOUNT, "總金額：150"), Some("150"));
    }

    #[test]
    fn test_positional_layout_partial() {
        let caps = POSITIONAL_LAYOUT.captures("AB123456781130105").unwrap();
        assert_eq!(&caps[1], "AB12345678");
        assert_eq!(&caps[2], "1130105");
        assert!(caps.get(4).is_none());
    }
}
