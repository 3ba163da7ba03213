//! Frappe/ERPNext REST client for reading invoice records and writing back
//! issuance results.

mod client;

pub use client::*;
