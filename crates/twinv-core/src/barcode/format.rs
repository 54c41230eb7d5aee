//! Barcode symbology detection from the decoded text.

use serde::{Deserialize, Serialize};

/// Symbology guessed from a barcode's length and alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarcodeFormat {
    Ean13,
    UpcA,
    Ean8,
    UpcE,
    Code39,
    Unknown,
}

impl BarcodeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeFormat::Ean13 => "EAN-13",
            BarcodeFormat::UpcA => "UPC-A",
            BarcodeFormat::Ean8 => "EAN-8",
            BarcodeFormat::UpcE => "UPC-E",
            BarcodeFormat::Code39 => "Code 39",
            BarcodeFormat::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess the symbology of `barcode`.
pub fn detect_barcode_format(barcode: &str) -> BarcodeFormat {
    let len = barcode.chars().count();
    let numeric = len > 0 && barcode.bytes().all(|b| b.is_ascii_digit());

    match len {
        13 if numeric => BarcodeFormat::Ean13,
        12 if numeric => BarcodeFormat::UpcA,
        8 if numeric => BarcodeFormat::Ean8,
        1..=6 if numeric => BarcodeFormat::UpcE,
        _ if len > 0
            && barcode
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) =>
        {
            BarcodeFormat::Code39
        }
        _ => BarcodeFormat::Unknown,
    }
}
