//! Projections of decoded invoices for inventory intake and storage.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::invoice::{TaiwanInvoice, DEFAULT_UNIT};

/// Category assigned to every item imported from an e-invoice.
pub const IMPORT_CATEGORY: &str = "Taiwan Import";

/// Source tag of inventory items built from an e-invoice.
pub const INVENTORY_SOURCE: &str = "taiwan_einvoice";

/// Source tag of stored invoice rows.
pub const ROW_SOURCE: &str = "taiwan_einvoice_decoder";

/// Language recorded on stored invoice rows.
pub const ROW_LANGUAGE: &str = "zh-TW";

/// An item ready for warehouse intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub price: Decimal,
    pub description: String,
    pub category: String,
    pub source: String,
}

/// Build inventory items from a decoded invoice.
///
/// Invalid invoices yield nothing. An invoice without items yields one
/// general item priced at the invoice total.
pub fn extract_items_from_taiwan_invoice(invoice: &TaiwanInvoice) -> Vec<InventoryItem> {
    if !invoice.is_valid {
        return Vec::new();
    }

    if invoice.items.is_empty() {
        return vec![InventoryItem {
            name: format!("{} - {}", IMPORT_CATEGORY, invoice.seller_name),
            quantity: Decimal::ONE,
            unit: DEFAULT_UNIT.to_string(),
            price: invoice.total_amount,
            description: format!(
                "Taiwan e-invoice from {} (Invoice: {})",
                invoice.seller_name, invoice.invoice_number
            ),
            category: IMPORT_CATEGORY.to_string(),
            source: INVENTORY_SOURCE.to_string(),
        }];
    }

    invoice
        .items
        .iter()
        .map(|item| InventoryItem {
            name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            price: item.price,
            description: format!("Taiwan e-invoice item from {}", invoice.seller_name),
            category: IMPORT_CATEGORY.to_string(),
            source: INVENTORY_SOURCE.to_string(),
        })
        .collect()
}

/// Storage row for a decoded invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRow {
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    pub seller_name: String,
    pub seller_tax_id: String,
    pub buyer_name: Option<String>,
    pub buyer_tax_id: Option<String>,
    pub total_amount: Decimal,
    pub tax_amount: Decimal,
    pub is_valid: bool,
    pub source: String,
    pub language: String,
    pub items: Vec<InvoiceRowItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage row for one invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRowItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub price: Decimal,
    pub amount: Decimal,
    pub tax_rate: Decimal,
}

impl InvoiceRow {
    /// Project `invoice` with both timestamps set to `now`. `None` if invalid.
    pub fn from_invoice(invoice: &TaiwanInvoice, now: DateTime<Utc>) -> Option<Self> {
        if !invoice.is_valid {
            return None;
        }

        let items = invoice
            .items
            .iter()
            .map(|item| InvoiceRowItem {
                name: item.name.clone(),
                quantity: item.quantity,
                unit: item.unit.clone(),
                price: item.price,
                amount: item.amount,
                tax_rate: item.tax_rate,
            })
            .collect();

        Some(Self {
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date,
            seller_name: invoice.seller_name.clone(),
            seller_tax_id: invoice.seller_tax_id.clone(),
            buyer_name: invoice.buyer_name.clone().filter(|s| !s.is_empty()),
            buyer_tax_id: invoice.buyer_tax_id.clone().filter(|s| !s.is_empty()),
            total_amount: invoice.total_amount,
            tax_amount: invoice.tax_amount,
            is_valid: invoice.is_valid,
            source: ROW_SOURCE.to_string(),
            language: ROW_LANGUAGE.to_string(),
            items,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Project a decoded invoice into a storage row stamped with the current time.
pub fn parse_taiwan_invoice_to_row(invoice: &TaiwanInvoice) -> Option<InvoiceRow> {
    InvoiceRow::from_invoice(invoice, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{FixedClock, TaiwanInvoiceDecoder};
    use crate::error::DecodeError;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap()
    }

    fn decode(text: &str) -> TaiwanInvoice {
        TaiwanInvoiceDecoder::new().with_clock(FixedClock(now())).decode(text)
    }

    #[test]
    fn test_items_projected() {
        let invoice = decode("賣方: 家樂福\n洗衣精 2 199 398\n衛生紙 1 289 289");
        let items = extract_items_from_taiwan_invoice(&invoice);

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            InventoryItem {
                name: "洗衣精".to_string(),
                quantity: Decimal::from(2),
                unit: "piece".to_string(),
                price: Decimal::from(199),
                description: "Taiwan e-invoice item from 家樂福".to_string(),
                category: "Taiwan Import".to_string(),
                source: "taiwan_einvoice".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_invoice_yields_nothing() {
        let invoice = TaiwanInvoice::error_result(&DecodeError::Empty);

        assert!(extract_items_from_taiwan_invoice(&invoice).is_empty());
        assert_eq!(parse_taiwan_invoice_to_row(&invoice), None);
    }

    #[test]
    fn test_general_item_when_no_items() {
        let mut invoice = decode("發票號碼: AB12345678\n賣方: 全聯\n總金額: 120");
        invoice.items.clear();

        let items = extract_items_from_taiwan_invoice(&invoice);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Taiwan Import - 全聯");
        assert_eq!(items[0].quantity, Decimal::ONE);
        assert_eq!(items[0].price, Decimal::from(120));
        assert_eq!(items[0].description, "Taiwan e-invoice from 全聯 (Invoice: AB12345678)");
    }

    #[test]
    fn test_row_projection() {
        let invoice = decode("發票號碼: AB12345678\n發票日期: 2024-03-01\n賣方: 全聯\n牛奶 1 95 95\n總金額: 95");
        let row = InvoiceRow::from_invoice(&invoice, now()).unwrap();

        assert_eq!(row.invoice_number, "AB12345678");
        assert_eq!(row.invoice_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(row.source, "taiwan_einvoice_decoder");
        assert_eq!(row.language, "zh-TW");
        assert_eq!(row.buyer_name, None);
        assert_eq!(row.created_at, now());
        assert_eq!(row.updated_at, now());
        assert_eq!(row.items.len(), 1);
        assert_eq!(row.items[0].amount, Decimal::from(95));
        assert_eq!(row.items[0].tax_rate, Decimal::new(50, 1));
    }

    #[test]
    fn test_row_serializes_camel_case() {
        let invoice = decode("發票號碼: AB12345678\n發票日期: 2024-03-01\n總金額: 95");
        let row = InvoiceRow::from_invoice(&invoice, now()).unwrap();
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["invoiceNumber"], "AB12345678");
        assert_eq!(json["invoiceDate"], "2024-03-01");
        assert_eq!(json["isValid"], true);
        assert!(json["items"][0].get("taxRate").is_some());
    }
}
