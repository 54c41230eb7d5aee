//! QR payload decoding.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use tracing::trace;

/// Standard alphabet, padding optional (scanners often drop it).
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Working text for a scanned payload.
///
/// Base64 payloads are decoded when they yield readable text; anything else
/// (plain text, binary output, invalid base64) is used as scanned.
pub fn decode_payload(raw: &str) -> String {
    match decode_base64_text(raw.trim()) {
        Some(text) => {
            trace!("Payload decoded from base64 ({} bytes)", text.len());
            text
        }
        None => raw.to_string(),
    }
}

fn decode_base64_text(s: &str) -> Option<String> {
    let bytes = LENIENT_STANDARD.decode(s).ok()?;
    let text = String::from_utf8(bytes).ok()?;

    let readable = !text.trim().is_empty()
        && text
            .chars()
            .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'));

    readable.then_some(text)
}
