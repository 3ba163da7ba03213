//! Core NF-e types, tax engine, classification and invoice assembly.
//!
//! Everything here is pure computation: no network, storage or logging.
//! The wire types serialize to the NFe.io product-invoice JSON schema.

mod builder;
mod classify;
mod digits;
mod error;
mod operation;
mod source;
mod tax;
mod types;
mod validation;

pub use builder::*;
pub use classify::*;
pub use digits::*;
pub use error::*;
pub use operation::*;
pub use source::{Carrier, SourceItem, SourceRecord, TaxTemplate};
pub use tax::{
    calculate_difal, calculate_difal_simple, calculate_tax, TaxInput, DEFAULT_ICMS_CST,
    DEFAULT_ICMS_MODALITY, DEFAULT_ICMS_ORIGIN, DEFAULT_IPI_CST, DEFAULT_PIS_COFINS_CST,
};
pub use types::*;
pub use validation::*;
