//! Taiwan e-invoice data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Unit recorded on every decoded line item.
pub const DEFAULT_UNIT: &str = "piece";

/// Business tax rate (營業稅) applied to decoded line items, in percent.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(50, 0, 0, false, 1);

/// A decoded Taiwan e-invoice (電子發票).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaiwanInvoice {
    /// Invoice number (發票號碼), e.g. `AB12345678`, or a `QR_` placeholder.
    pub invoice_number: String,

    /// Invoice date (發票日期). `None` only on the hard-error record.
    pub invoice_date: Option<NaiveDate>,

    /// Seller name (賣方名稱).
    pub seller_name: String,

    /// Seller unified business number (賣方統編).
    pub seller_tax_id: String,

    /// Buyer name (買方名稱).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,

    /// Buyer unified business number (買方統編).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_tax_id: Option<String>,

    /// Total amount (總金額) in NTD.
    pub total_amount: Decimal,

    /// Tax amount (稅額) in NTD.
    pub tax_amount: Decimal,

    /// Purchased items.
    pub items: Vec<LineItem>,

    /// Raw left QR code content, attached by receipt assembly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_qr_code: Option<String>,

    /// Raw right QR code content, attached by receipt assembly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_qr_code: Option<String>,

    /// Raw 1D barcode content, attached by receipt assembly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    /// False only when decoding failed outright.
    ///
    /// This does not mean the fields are accurate: every non-empty payload
    /// decodes to a valid record. Check [`defaulted_fields`](Self::defaulted_fields)
    /// to see which values were guessed.
    pub is_valid: bool,

    /// Hard-failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Fields that fell back to a default instead of being extracted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted_fields: Vec<InvoiceField>,
}

/// Invoice fields that can be defaulted during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceField {
    InvoiceNumber,
    InvoiceDate,
    SellerName,
    SellerTaxId,
    TotalAmount,
    TaxAmount,
    Items,
}

impl InvoiceField {
    /// Fields counted by [`TaiwanInvoice::completeness`]. Buyer fields are
    /// optional on consumer receipts and are never defaulted.
    pub const CORE: [InvoiceField; 7] = [
        InvoiceField::InvoiceNumber,
        InvoiceField::InvoiceDate,
        InvoiceField::SellerName,
        InvoiceField::SellerTaxId,
        InvoiceField::TotalAmount,
        InvoiceField::TaxAmount,
        InvoiceField::Items,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceField::InvoiceNumber => "invoice number",
            InvoiceField::InvoiceDate => "invoice date",
            InvoiceField::SellerName => "seller name",
            InvoiceField::SellerTaxId => "seller tax ID",
            InvoiceField::TotalAmount => "total amount",
            InvoiceField::TaxAmount => "tax amount",
            InvoiceField::Items => "items",
        }
    }
}

/// A purchased item on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name (商品名稱).
    pub name: String,

    /// Quantity (數量).
    pub quantity: Decimal,

    /// Unit (單位).
    pub unit: String,

    /// Unit price (單價).
    pub price: Decimal,

    /// Line amount (金額).
    pub amount: Decimal,

    /// Tax rate in percent (稅率).
    pub tax_rate: Decimal,
}

impl LineItem {
    /// Create an item with the default unit and tax rate.
    pub fn new(name: impl Into<String>, quantity: Decimal, price: Decimal, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: DEFAULT_UNIT.to_string(),
            price,
            amount,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }

    /// Single-quantity item priced at `amount`.
    pub fn single(name: impl Into<String>, amount: Decimal) -> Self {
        Self::new(name, Decimal::ONE, amount, amount)
    }
}

/// Raw codes scanned from a paper e-invoice receipt.
///
/// A printed receipt carries two QR codes and one 1D barcode. The left QR
/// holds the invoice header, the right QR holds item details, and the
/// barcode repeats the invoice number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptCodes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

/// A decoded receipt: the raw codes plus the chosen invoice record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaiwanReceipt {
    pub left_qr_code: String,
    pub right_qr_code: String,
    pub barcode: String,
    pub invoice: TaiwanInvoice,
}

impl TaiwanInvoice {
    /// Hard-error record: every field at its zero value.
    pub fn error_result(error: &DecodeError) -> Self {
        Self {
            invoice_number: String::new(),
            invoice_date: None,
            seller_name: String::new(),
            seller_tax_id: String::new(),
            buyer_name: None,
            buyer_tax_id: None,
            total_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            items: Vec::new(),
            left_qr_code: None,
            right_qr_code: None,
            barcode: None,
            is_valid: false,
            error: Some(error.to_string()),
            defaulted_fields: Vec::new(),
        }
    }

    /// Whether `field` was defaulted rather than extracted.
    pub fn is_defaulted(&self, field: InvoiceField) -> bool {
        self.defaulted_fields.contains(&field)
    }

    /// Share of core fields that were actually extracted (0.0 - 1.0).
    pub fn completeness(&self) -> f32 {
        if !self.is_valid {
            return 0.0;
        }

        let extracted = InvoiceField::CORE
            .iter()
            .filter(|f| !self.is_defaulted(**f))
            .count();

        extracted as f32 / InvoiceField::CORE.len() as f32
    }

    /// Invoice date as `YYYY-MM-DD`, empty for the hard-error record.
    pub fn invoice_date_string(&self) -> String {
        self.invoice_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

impl TaiwanReceipt {
    /// Wrap `invoice` with the raw receipt codes, attaching them to the record as well.
    pub fn new(codes: &ReceiptCodes, mut invoice: TaiwanInvoice) -> Self {
        let left = codes.left_qr_code.clone().unwrap_or_default();
        let right = codes.right_qr_code.clone().unwrap_or_default();
        let barcode = codes.barcode.clone().unwrap_or_default();

        invoice.left_qr_code = Some(left.clone());
        invoice.right_qr_code = Some(right.clone());
        invoice.barcode = Some(barcode.clone());

        Self {
            left_qr_code: left,
            right_qr_code: right,
            barcode,
            invoice,
        }
    }
}
