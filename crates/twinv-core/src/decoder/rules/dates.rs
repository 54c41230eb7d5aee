//! Date extraction for Taiwan e-invoices.

use chrono::NaiveDate;

use super::layout::PositionalLayout;
use super::patterns::{DATE_LABELED, DATE_YMD};
use super::{ExtractionMatch, FieldOrigin};

/// Offset between the ROC (民國) calendar and the Gregorian calendar.
pub const ROC_YEAR_OFFSET: i32 = 1911;

/// Parse `YYYY-MM-DD` or `YYYY/MM/DD`.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let caps = DATE_YMD.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert a 7-digit ROC date (`YYYMMDD`) to a Gregorian date.
pub fn roc_to_gregorian(roc: &str) -> Option<NaiveDate> {
    if roc.len() != 7 || !roc.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let roc_year: i32 = roc[0..3].parse().ok()?;
    let month: u32 = roc[3..5].parse().ok()?;
    let day: u32 = roc[5..7].parse().ok()?;
    NaiveDate::from_ymd_opt(roc_year + ROC_YEAR_OFFSET, month, day)
}

/// Extract the invoice date.
///
/// Order: labeled date, then any date in the text, then the positional ROC
/// date. Candidates that are not real calendar dates are skipped.
pub fn extract_invoice_date(
    text: &str,
    layout: Option<&PositionalLayout>,
) -> Option<ExtractionMatch<NaiveDate>> {
    for re in DATE_LABELED.iter() {
        if let Some(caps) = re.captures(text) {
            if let Some(date) = parse_date_text(&caps[1]) {
                return Some(ExtractionMatch::new(date, FieldOrigin::Labeled, &caps[0]));
            }
        }
    }

    for m in DATE_YMD.find_iter(text) {
        if let Some(date) = parse_date_text(m.as_str()) {
            return Some(ExtractionMatch::new(date, FieldOrigin::Pattern, m.as_str()));
        }
    }

    let layout = layout?;
    let date = layout.invoice_date()?;
    Some(ExtractionMatch::new(
        date,
        FieldOrigin::Positional,
        layout.roc_date.clone().unwrap_or_default(),
    ))
}
