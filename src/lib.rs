//! # nfe-bridge
//!
//! Brazilian electronic product invoice (NF-e) issuance: turns ERP invoice
//! records into NFe.io product-invoice requests.
//!
//! The core covers buyer classification (CPF/CNPJ, ICMS contributor status),
//! CFOP and series resolution, and the ICMS/PIS/COFINS/IPI/DIFAL tax engine.
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use nfe_bridge::core::*;
//! use rust_decimal_macros::dec;
//!
//! let record = SourceRecord {
//!     name: "INV-0001".into(),
//!     client_name: Some("ACME Ltda".into()),
//!     client_id_number: Some("12.345.678/0001-90".into()),
//!     contribuinte_icms: Some("Contribuinte".into()),
//!     inscricao_estadual: Some("110.042.490.114".into()),
//!     city: Some("São Paulo".into()),
//!     delivery_ibge: Some("3550308".into()),
//!     delivery_state: Some("SP".into()),
//!     operation_nature: Some("Venda".into()),
//!     invoices_table: vec![SourceItem {
//!         item_name: Some("Cadeira".into()),
//!         ncm: Some("9401.30.00".into()),
//!         rate: Some(dec!(100)),
//!         quantity: Some(dec!(2)),
//!         icms_rate: Some(dec!(18)),
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! let request = build_invoice(&record, "SP", None, None).unwrap();
//!
//! assert!(validate_request(&request).is_empty());
//! assert_eq!(request.items[0].cfop.code(), 5102);
//! assert_eq!(request.items[0].tax.icms.amount, dec!(36.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Wire types, tax engine, classification, CFOP, assembler, validation |
//! | `nfeio` | NFe.io product-invoice REST client |
//! | `frappe` | Frappe/ERPNext REST client |
//! | `bridge` | Config, webhook HMAC auth, issuance orchestrator |
//! | `server` | axum HTTP routes and the `nfe-bridge` binary |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "nfeio")]
pub mod nfeio;

#[cfg(feature = "frappe")]
pub mod frappe;

#[cfg(feature = "bridge")]
pub mod bridge;

#[cfg(feature = "server")]
pub mod server;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
