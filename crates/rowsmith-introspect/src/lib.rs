//! Live-catalog introspection for MySQL.

pub mod mysql;

pub use mysql::{current_database, describe_table, quote_ident};

pub use rowsmith_core::TableSchema;
