use std::collections::HashSet;

use rowsmith_core::{Column, ColumnKind, SeededColumn, UniqueConstraint};

use crate::mysql::queries::{RawColumn, RawUniqueColumn};

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<Column> {
    raw.into_iter().map(map_column).collect()
}

fn map_column(raw: RawColumn) -> Column {
    let data_type = raw.data_type.to_lowercase();
    let kind = ColumnKind::from_data_type(&data_type);
    let extra = raw.extra.to_lowercase();
    let is_auto_generated = extra.contains("auto_increment");
    let is_generated = extra.contains("virtual generated") || extra.contains("stored generated");
    let has_default = raw.default.is_some() || extra.contains("default_generated");

    Column {
        name: raw.name,
        data_type,
        kind,
        is_nullable: raw.is_nullable.eq_ignore_ascii_case("yes"),
        has_default,
        max_length: raw.max_length,
        is_primary_key: raw.column_key.eq_ignore_ascii_case("pri"),
        is_auto_generated,
        is_generated,
    }
}

/// Group the flat constraint/column listing into one entry per constraint,
/// preserving column order.
pub fn group_unique_constraints(raw: Vec<RawUniqueColumn>) -> Vec<UniqueConstraint> {
    let mut constraints: Vec<UniqueConstraint> = Vec::new();
    for entry in raw {
        match constraints
            .iter_mut()
            .find(|constraint| constraint.name == entry.constraint_name)
        {
            Some(constraint) => constraint.columns.push(entry.column),
            None => constraints.push(UniqueConstraint {
                name: entry.constraint_name,
                columns: vec![entry.column],
                seeded: None,
            }),
        }
    }
    constraints
}

/// Choose the one column in a unique constraint that will carry
/// uniqueness: the first participating column that is numeric or text.
pub fn pick_seeded_column(columns: &[Column], constraint: &UniqueConstraint) -> Option<Column> {
    constraint.columns.iter().find_map(|name| {
        columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name) && column.kind.is_randomizable())
            .cloned()
    })
}

pub fn seed(column: &Column, existing: Vec<String>) -> SeededColumn {
    SeededColumn {
        column: column.name.clone(),
        existing: existing.into_iter().collect::<HashSet<_>>(),
    }
}
