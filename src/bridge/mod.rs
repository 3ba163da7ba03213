//! Issuance orchestration: configuration, webhook authentication, and the
//! fetch, assemble, validate, dispatch and write-back pipeline.

mod config;
mod issuer;
mod webhook;

pub use config::*;
pub use issuer::*;
pub use webhook::*;
