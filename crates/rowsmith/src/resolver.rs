use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use rowsmith_core::{Column, Error, Result, SynthesisOptions, TableSchema, Value};

use crate::connector::Connector;
use crate::synth;

/// Mutable state shared across one whole recursive resolution: the keys
/// already produced per table, and the random source. Created per
/// top-level call, never reused.
pub(crate) struct ResolutionContext {
    created: HashMap<String, Vec<Value>>,
    rng: ChaCha8Rng,
}

impl ResolutionContext {
    fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            created: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

/// Raw outcome of resolving one table.
pub(crate) struct Resolved {
    pub key: Vec<Value>,
    /// Whether the key came from an already-existing row.
    pub reused: bool,
}

pub(crate) async fn resolve_schema_name<C: Connector + ?Sized>(
    connector: &C,
    options: &SynthesisOptions,
) -> Result<String> {
    if let Some(database) = &options.database {
        return Ok(database.clone());
    }
    connector
        .default_schema()
        .await?
        .filter(|name| !name.trim().is_empty())
        .ok_or(Error::DatabaseNameUnknown)
}

/// Run one full resolution for `table` with a fresh context.
///
/// `skip_existing` suppresses the get-or-create fast path for the root
/// table only; recursive descents always honor `options.force_create`.
pub(crate) async fn resolve_root<C: Connector + ?Sized>(
    connector: &C,
    schema_name: &str,
    table: &str,
    options: &SynthesisOptions,
    skip_existing: bool,
) -> Result<Resolved> {
    let mut ctx = ResolutionContext::new(options.random_seed);
    resolve_table(
        connector,
        &mut ctx,
        schema_name,
        Vec::new(),
        table.to_string(),
        options.clone(),
        skip_existing,
    )
    .await
}

/// Resolve one table, recursing into referenced tables as needed.
///
/// `path` holds the tables currently being resolved above this one and is
/// used only for cycle detection; the memoization map lives in `ctx`.
fn resolve_table<'a, C: Connector + ?Sized>(
    connector: &'a C,
    ctx: &'a mut ResolutionContext,
    schema_name: &'a str,
    path: Vec<String>,
    table: String,
    options: SynthesisOptions,
    skip_existing: bool,
) -> Pin<Box<dyn Future<Output = Result<Resolved>> + Send + 'a>> {
    Box::pin(async move {
        debug!(table = %table, depth = path.len(), "resolving table");
        let schema = connector.describe(schema_name, &table).await?;
        let primary_key = schema.primary_key_columns();
        if primary_key.is_empty() {
            return Err(Error::PrimaryKeyNotFound {
                schema: schema_name.to_string(),
                table: table.clone(),
            });
        }

        if !options.force_create && !skip_existing {
            if let Some(key) = connector
                .fetch_existing_key(schema_name, &table, &primary_key)
                .await?
            {
                debug!(table = %table, "reusing existing row");
                return Ok(Resolved { key, reused: true });
            }
        }

        let TableSchema {
            columns,
            foreign_keys,
            mut uniques,
            ..
        } = schema;
        let required = required_columns(&columns, &options);

        let mut values = Vec::with_capacity(required.len());
        for column in &required {
            if let Some(value) = options.column_value(&column.name) {
                values.push(value.clone());
                continue;
            }
            if let Some(key) = options.foreign_key(&column.name) {
                values.push(key.clone());
                continue;
            }

            let target = foreign_keys
                .iter()
                .find(|fk| fk.column.eq_ignore_ascii_case(&column.name))
                .map(|fk| fk.referenced_table.clone());
            let Some(target) = target else {
                values.push(synth::synthesize(column, &mut uniques, &options, &mut ctx.rng));
                continue;
            };

            if let Some(key) = ctx.created.get(&target) {
                debug!(
                    table = %table,
                    column = %column.name,
                    target = %target,
                    "reusing dependency created earlier in this resolution"
                );
                values.push(key.first().cloned().unwrap_or(Value::Null));
                continue;
            }

            let occurrences = path.iter().filter(|name| **name == target).count();
            if occurrences >= 1 {
                if column.is_nullable {
                    debug!(
                        table = %table,
                        column = %column.name,
                        target = %target,
                        "breaking reference cycle by leaving column null"
                    );
                    values.push(Value::Null);
                    continue;
                }
                if occurrences >= 2 {
                    let mut full_path = path.clone();
                    full_path.push(table.clone());
                    return Err(Error::CircularReference {
                        table: table.clone(),
                        column: column.name.clone(),
                        path: full_path,
                    });
                }
                // One revisit of a NOT NULL edge is allowed: a diamond or
                // back-reference can complete on the second pass.
            }

            let self_referential = target == table;
            let nested = options.nested(options.force_populate_optional_columns && !self_referential);
            let mut child_path = path.clone();
            child_path.push(table.clone());
            let resolved = resolve_table(
                connector,
                ctx,
                schema_name,
                child_path,
                target.clone(),
                nested,
                false,
            )
            .await?;
            let key = resolved.key.first().cloned().unwrap_or(Value::Null);
            ctx.created.insert(target, resolved.key);
            values.push(key);
        }

        let key = connector
            .insert_row(schema_name, &table, &required, &values, &primary_key)
            .await?;
        info!(table = %table, "fixture row created");
        Ok(Resolved { key, reused: false })
    })
}

/// The columns that must receive a value in the INSERT: non-generated
/// primary-key columns, NOT NULL columns without a default, anything the
/// caller overrode, and, under force-populate, everything else.
fn required_columns(columns: &[Column], options: &SynthesisOptions) -> Vec<Column> {
    let mut required = Vec::new();
    for column in columns {
        if column.is_generated {
            continue;
        }
        if column.is_primary_key {
            if !column.is_auto_generated {
                required.push(column.clone());
            }
            continue;
        }
        let needed = (!column.is_nullable && !column.has_default)
            || options.column_value(&column.name).is_some()
            || options.foreign_key(&column.name).is_some()
            || options.force_populate_optional_columns;
        if needed {
            required.push(column.clone());
        }
    }
    required
}

#[cfg(test)]
mod tests {
    use rowsmith_core::ColumnKind;

    use super::*;

    fn column(name: &str, nullable: bool, has_default: bool) -> Column {
        Column {
            name: name.to_string(),
            data_type: "varchar".to_string(),
            kind: ColumnKind::Text,
            is_nullable: nullable,
            has_default,
            max_length: Some(50),
            is_primary_key: false,
            is_auto_generated: false,
            is_generated: false,
        }
    }

    #[test]
    fn only_mandatory_columns_are_required_by_default() {
        let mut id = column("Id", false, false);
        id.is_primary_key = true;
        id.is_auto_generated = true;
        let columns = vec![
            id,
            column("Name", false, false),
            column("Subtitle", true, false),
            column("CreatedAt", false, true),
        ];

        let required = required_columns(&columns, &SynthesisOptions::new());
        let names: Vec<&str> = required.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Name"]);
    }

    #[test]
    fn overrides_and_force_populate_extend_the_required_set() {
        let columns = vec![
            column("Name", false, false),
            column("Subtitle", true, false),
            column("Notes", true, true),
        ];

        let with_override = SynthesisOptions::new().with_column_value("Subtitle", "x");
        let names: Vec<String> = required_columns(&columns, &with_override)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Name", "Subtitle"]);

        let populate_all = SynthesisOptions::new().force_populate_optional_columns();
        assert_eq!(required_columns(&columns, &populate_all).len(), 3);
    }

    #[test]
    fn generated_and_auto_columns_are_never_required() {
        let mut auto_id = column("Id", false, false);
        auto_id.is_primary_key = true;
        auto_id.is_auto_generated = true;
        let mut derived = column("Total", true, false);
        derived.is_generated = true;
        let mut manual_pk = column("Code", false, false);
        manual_pk.is_primary_key = true;

        let columns = vec![auto_id, derived, manual_pk];
        let options = SynthesisOptions::new().force_populate_optional_columns();
        let names: Vec<String> = required_columns(&columns, &options)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Code"]);
    }
}
