//! Data models for decoded invoices and configuration.

pub mod config;
pub mod invoice;
