//! Report ingestion: field extraction, block parsing and the shared document model.
//!
//! Everything in this module is pure and total. A [`DocumentModel`] is built
//! once per report and then handed, read-only, to every exporter in
//! [`crate::export`].

pub mod types;
pub mod fields;
pub mod blocks;
pub mod model;
pub mod sanitize;
pub mod record;

pub use types::*;
pub use fields::*;
pub use blocks::*;
pub use model::*;
pub use sanitize::*;
pub use record::*;
