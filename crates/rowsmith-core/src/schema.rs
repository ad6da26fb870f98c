use std::collections::HashSet;

/// Declared column type, normalized to the closed set the synthesizer
/// understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    FixedChar,
    Temporal,
    Binary,
    Flag,
    Json,
}

impl ColumnKind {
    /// Normalize a raw MySQL `DATA_TYPE` into a kind. Unknown types fall
    /// back to `Text`.
    pub fn from_data_type(data_type: &str) -> Self {
        match data_type.to_ascii_lowercase().as_str() {
            "int" | "integer" | "bigint" | "smallint" | "mediumint" | "decimal" | "numeric"
            | "float" | "double" | "year" => ColumnKind::Integer,
            "tinyint" | "bit" | "bool" | "boolean" => ColumnKind::Flag,
            "char" => ColumnKind::FixedChar,
            "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => {
                ColumnKind::Binary
            }
            "date" | "datetime" | "timestamp" | "time" => ColumnKind::Temporal,
            "json" => ColumnKind::Json,
            _ => ColumnKind::Text,
        }
    }

    /// Whether values of this kind can be randomized safely enough to
    /// carry a unique constraint.
    pub fn is_randomizable(&self) -> bool {
        matches!(
            self,
            ColumnKind::Integer | ColumnKind::Text | ColumnKind::FixedChar
        )
    }
}

/// Column metadata for one table, immutable for the duration of a
/// resolution step.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// Raw lowercase MySQL data type, e.g. `varchar`.
    pub data_type: String,
    pub kind: ColumnKind,
    pub is_nullable: bool,
    pub has_default: bool,
    pub max_length: Option<u64>,
    pub is_primary_key: bool,
    /// Populated by the engine on insert (auto_increment).
    pub is_auto_generated: bool,
    /// VIRTUAL/STORED generated columns may never be written.
    pub is_generated: bool,
}

/// One outgoing foreign-key edge: owning column to referenced table.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: String,
    pub referenced_table: String,
}

/// The column chosen to carry a unique constraint, with the values
/// already present in it across the table.
#[derive(Debug, Clone)]
pub struct SeededColumn {
    pub column: String,
    pub existing: HashSet<String>,
}

/// A unique constraint and its participating columns.
#[derive(Debug, Clone)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
    pub seeded: Option<SeededColumn>,
}

/// Schema snapshot for one table, read fresh per resolution call.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub schema: String,
    pub table: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub uniques: Vec<UniqueConstraint>,
}

impl TableSchema {
    pub fn primary_key_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|column| column.is_primary_key)
            .cloned()
            .collect()
    }
}
