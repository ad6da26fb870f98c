//! Core contracts shared across rowsmith crates.
//!
//! This crate defines the table-schema model read from the live catalog,
//! the value union bound into parametrized SQL, the caller-facing
//! synthesis options, and the error type.

pub mod error;
pub mod options;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use options::SynthesisOptions;
pub use schema::{Column, ColumnKind, ForeignKey, SeededColumn, TableSchema, UniqueConstraint};
pub use value::Value;
