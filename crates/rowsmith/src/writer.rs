use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool, Row};

use rowsmith_core::{Column, ColumnKind, Error, Result, Value};
use rowsmith_introspect::quote_ident;

/// Insert one row and return its raw primary-key value(s).
///
/// A single auto-generated key is read back through the engine's
/// last-insert-id mechanism; composite or caller-supplied keys are
/// re-selected using the key values that went into the INSERT.
pub async fn insert_row(
    pool: &MySqlPool,
    schema: &str,
    table: &str,
    columns: &[Column],
    values: &[Value],
    primary_key: &[Column],
) -> Result<Vec<Value>> {
    let sql = insert_sql(schema, table, columns);
    tracing::debug!(table, sql = %sql, "executing insert");

    let mut query = sqlx::query(&sql);
    for value in values {
        query = bind_value(query, value);
    }

    let result = query.execute(pool).await.map_err(|err| Error::InsertFailed {
        table: table.to_string(),
        sql: sql.clone(),
        message: err.to_string(),
    })?;

    if let [key] = primary_key {
        if key.is_auto_generated {
            let id = result.last_insert_id();
            tracing::info!(table, id, "row inserted");
            return Ok(vec![Value::UInt(id)]);
        }
    }

    reselect_key(pool, schema, table, columns, values, primary_key).await
}

/// First existing row's primary-key value(s), if the table has any rows.
pub async fn fetch_first_key(
    pool: &MySqlPool,
    schema: &str,
    table: &str,
    primary_key: &[Column],
) -> Result<Option<Vec<Value>>> {
    let sql = select_first_sql(schema, table, primary_key);
    let row = sqlx::query(&sql)
        .fetch_optional(pool)
        .await
        .map_err(|err| Error::Db(err.to_string()))?;

    match row {
        Some(row) => Ok(Some(read_key_values(&row, table, primary_key)?)),
        None => Ok(None),
    }
}

async fn reselect_key(
    pool: &MySqlPool,
    schema: &str,
    table: &str,
    columns: &[Column],
    values: &[Value],
    primary_key: &[Column],
) -> Result<Vec<Value>> {
    let mut filters = Vec::new();
    for key in primary_key {
        if let Some(position) = columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(&key.name))
        {
            filters.push((key.name.as_str(), values[position].clone()));
        }
    }
    if filters.is_empty() {
        return Err(Error::Decode {
            table: table.to_string(),
            reason: "no primary-key values were supplied in the insert".to_string(),
        });
    }

    let sql = select_by_key_sql(schema, table, primary_key, &filters);
    let mut query = sqlx::query(&sql);
    for (_, value) in &filters {
        query = bind_value(query, value);
    }

    let row = query
        .fetch_optional(pool)
        .await
        .map_err(|err| Error::Db(err.to_string()))?
        .ok_or_else(|| Error::Decode {
            table: table.to_string(),
            reason: "inserted row not found on re-select".to_string(),
        })?;

    read_key_values(&row, table, primary_key)
}

pub(crate) fn insert_sql(schema: &str, table: &str, columns: &[Column]) -> String {
    let names = columns
        .iter()
        .map(|column| quote_ident(&column.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = columns
        .iter()
        .map(|_| "?")
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {}.{} ({}) VALUES ({})",
        quote_ident(schema),
        quote_ident(table),
        names,
        placeholders,
    )
}

pub(crate) fn select_first_sql(schema: &str, table: &str, primary_key: &[Column]) -> String {
    format!(
        "SELECT {} FROM {}.{} LIMIT 1",
        key_list(primary_key),
        quote_ident(schema),
        quote_ident(table),
    )
}

fn select_by_key_sql(
    schema: &str,
    table: &str,
    primary_key: &[Column],
    filters: &[(&str, Value)],
) -> String {
    let conditions = filters
        .iter()
        .map(|(name, _)| format!("{} = ?", quote_ident(name)))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(
        "SELECT {} FROM {}.{} WHERE {} LIMIT 1",
        key_list(primary_key),
        quote_ident(schema),
        quote_ident(table),
        conditions,
    )
}

fn key_list(primary_key: &[Column]) -> String {
    primary_key
        .iter()
        .map(|column| quote_ident(&column.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<i64>),
        Value::Bool(value) => query.bind(*value),
        Value::Int(value) => query.bind(*value),
        Value::UInt(value) => query.bind(*value),
        Value::Float(value) => query.bind(*value),
        Value::Text(value) => query.bind(value.clone()),
        Value::Bytes(value) => query.bind(value.clone()),
        Value::Date(value) => query.bind(*value),
        Value::Time(value) => query.bind(*value),
        Value::DateTime(value) => query.bind(*value),
        Value::Json(value) => query.bind(value.clone()),
    }
}

/// Decode the primary-key columns of a result row into raw values,
/// guided by the introspected column kinds.
fn read_key_values(row: &MySqlRow, table: &str, primary_key: &[Column]) -> Result<Vec<Value>> {
    primary_key
        .iter()
        .enumerate()
        .map(|(index, column)| read_value(row, index, table, column))
        .collect()
}

fn read_value(row: &MySqlRow, index: usize, table: &str, column: &Column) -> Result<Value> {
    let decode_err = |message: String| Error::Decode {
        table: table.to_string(),
        reason: format!("column `{}`: {message}", column.name),
    };

    match column.kind {
        ColumnKind::Integer | ColumnKind::Flag => {
            if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
                return Ok(value.map(Value::Int).unwrap_or(Value::Null));
            }
            row.try_get::<Option<u64>, _>(index)
                .map(|value| value.map(Value::UInt).unwrap_or(Value::Null))
                .map_err(|err| decode_err(err.to_string()))
        }
        ColumnKind::Text | ColumnKind::FixedChar => row
            .try_get::<Option<String>, _>(index)
            .map(|value| value.map(Value::Text).unwrap_or(Value::Null))
            .map_err(|err| decode_err(err.to_string())),
        ColumnKind::Binary => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map(|value| value.map(Value::Bytes).unwrap_or(Value::Null))
            .map_err(|err| decode_err(err.to_string())),
        ColumnKind::Temporal => {
            if let Ok(value) = row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
                return Ok(value.map(Value::DateTime).unwrap_or(Value::Null));
            }
            row.try_get::<Option<chrono::NaiveDate>, _>(index)
                .map(|value| value.map(Value::Date).unwrap_or(Value::Null))
                .map_err(|err| decode_err(err.to_string()))
        }
        ColumnKind::Json => row
            .try_get::<Option<serde_json::Value>, _>(index)
            .map(|value| value.map(Value::Json).unwrap_or(Value::Null))
            .map_err(|err| decode_err(err.to_string())),
    }
}
