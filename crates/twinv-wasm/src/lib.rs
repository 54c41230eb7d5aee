//! WASM bindings for Taiwan e-invoice decoding.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Only the offline parts of `twinv-core` are exposed.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use twinv_core::barcode::detect_barcode_format;
use twinv_core::{
    decode_taiwan_einvoice, decode_taiwan_receipt, extract_items_from_taiwan_invoice,
    ReceiptCodes,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode a scanned e-invoice QR payload.
///
/// Always returns an invoice object; check `is_valid` and `error`.
#[wasm_bindgen]
pub fn decode(qr_data: &str) -> Result<JsValue, JsValue> {
    to_js(&decode_taiwan_einvoice(qr_data))
}

/// Decode a paper receipt from its left/right QR codes and barcode.
#[wasm_bindgen]
pub fn decode_receipt(
    left_qr_code: Option<String>,
    right_qr_code: Option<String>,
    barcode: Option<String>,
) -> Result<JsValue, JsValue> {
    let codes = ReceiptCodes {
        left_qr_code,
        right_qr_code,
        barcode,
    };
    to_js(&decode_taiwan_receipt(&codes))
}

/// Check whether a payload looks like a Taiwan e-invoice.
#[wasm_bindgen]
pub fn is_taiwan_einvoice(qr_data: &str, user_language: Option<String>) -> bool {
    twinv_core::is_taiwan_einvoice(qr_data, user_language.as_deref())
}

/// Decode a payload and return its inventory items.
#[wasm_bindgen]
pub fn extract_items(qr_data: &str) -> Result<JsValue, JsValue> {
    let invoice = decode_taiwan_einvoice(qr_data);
    to_js(&extract_items_from_taiwan_invoice(&invoice))
}

/// Guess a barcode's symbology (e.g. `EAN-13`).
#[wasm_bindgen]
pub fn barcode_format(barcode: &str) -> String {
    detect_barcode_format(barcode).to_string()
}

/// Scanner helper bound to a user language.
#[wasm_bindgen]
pub struct EInvoiceScanner {
    language: String,
}

#[wasm_bindgen]
impl EInvoiceScanner {
    /// Create a scanner; `zh-TW` makes classification lenient.
    #[wasm_bindgen(constructor)]
    pub fn new(language: Option<String>) -> Self {
        Self {
            language: language.unwrap_or_else(|| "en".to_string()),
        }
    }

    /// The configured language.
    #[wasm_bindgen(getter)]
    pub fn language(&self) -> String {
        self.language.clone()
    }

    /// Classify a payload with this scanner's language.
    #[wasm_bindgen]
    pub fn classify(&self, qr_data: &str) -> bool {
        twinv_core::is_taiwan_einvoice(qr_data, Some(&self.language))
    }

    /// Decode the payload if it classifies as an e-invoice, else `null`.
    #[wasm_bindgen]
    pub fn scan(&self, qr_data: &str) -> Result<JsValue, JsValue> {
        if !self.classify(qr_data) {
            return Ok(JsValue::NULL);
        }
        decode(qr_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_is_taiwan_einvoice() {
        assert!(is_taiwan_einvoice("隨便文字", Some("zh-TW".to_string())));
        assert!(!is_taiwan_einvoice("https://example.com", Some("zh-TW".to_string())));
        assert!(is_taiwan_einvoice("AB12345678 2024-01-01", None));
    }

    #[wasm_bindgen_test]
    fn test_barcode_format() {
        assert_eq!(barcode_format("4710901898748"), "EAN-13");
        assert_eq!(barcode_format("abc"), "Unknown");
    }

    #[wasm_bindgen_test]
    fn test_scanner_language() {
        let scanner = EInvoiceScanner::new(Some("zh-TW".to_string()));
        assert_eq!(scanner.language(), "zh-TW");
        assert!(scanner.classify("隨便文字"));
        assert!(!EInvoiceScanner::new(None).classify("隨便文字"));
    }
}
