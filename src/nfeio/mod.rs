//! NFe.io product-invoice REST client.
//!
//! Sends assembled [`InvoiceRequest`](crate::core::InvoiceRequest)s to the
//! issuance provider and retrieves issued documents (status, DANFE PDF, XML,
//! correction letters).

mod client;
mod response;

pub use client::*;
pub use response::*;
