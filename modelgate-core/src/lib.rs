//! Shared domain types, canonicalization, pricing tables, and the `GatewayError` taxonomy used
//! by every ModelGate crate.

pub mod canonical;
pub mod error;
pub mod pricing;
pub mod types;

pub use error::{ErrorCategory, GatewayError};
pub use types::*;

pub type Result<T> = std::result::Result<T, GatewayError>;
