//! Data models for extracted receipts and pipeline configuration.

pub mod config;
pub mod receipt;
