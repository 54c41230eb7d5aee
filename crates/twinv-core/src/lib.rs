//! Core library for Taiwan e-invoice processing.
//!
//! This crate provides:
//! - Taiwan e-invoice QR payload decoding (base64 or raw text)
//! - Field and line-item extraction with positional layout fallbacks
//! - Two-QR receipt assembly and a format classifier
//! - Inventory and storage projections of decoded invoices
//! - A barcode recognition chain built from pluggable resolvers

pub mod error;
pub mod models;
pub mod decoder;
pub mod export;
pub mod barcode;

pub use error::{TwinvError, Result};
pub use models::invoice::{InvoiceField, LineItem, ReceiptCodes, TaiwanInvoice, TaiwanReceipt};
pub use models::config::TwinvConfig;
pub use decoder::{
    decode_taiwan_einvoice, decode_taiwan_receipt, is_taiwan_einvoice, parse_items_from_data,
    Clock, FixedClock, SystemClock, TaiwanInvoiceDecoder,
};
pub use export::{extract_items_from_taiwan_invoice, parse_taiwan_invoice_to_row, InventoryItem, InvoiceRow};
pub use barcode::{BarcodeResolver, ItemRecognition, RecognitionChain, RecognitionSource};
