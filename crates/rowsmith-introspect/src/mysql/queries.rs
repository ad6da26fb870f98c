use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

use rowsmith_core::{ColumnKind, Error, Result, Value};

/// Quote an identifier for interpolation into MySQL statement text.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn db_err(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

/// The database currently selected on the connection, if any.
pub async fn current_database(pool: &MySqlPool) -> Result<Option<String>> {
    sqlx::query_scalar::<_, Option<String>>("select database()")
        .fetch_one(pool)
        .await
        .map_err(db_err)
}

pub struct RawColumn {
    pub name: String,
    pub default: Option<String>,
    pub is_nullable: String,
    pub data_type: String,
    pub max_length: Option<u64>,
    pub column_key: String,
    pub extra: String,
}

pub async fn list_columns(pool: &MySqlPool, schema: &str, table: &str) -> Result<Vec<RawColumn>> {
    let rows = sqlx::query(
        r"
        select  COLUMN_NAME as name,
                COLUMN_DEFAULT as column_default,
                IS_NULLABLE as is_nullable,
                DATA_TYPE as data_type,
                CHARACTER_MAXIMUM_LENGTH as max_length,
                COLUMN_KEY as column_key,
                EXTRA as extra
        from    INFORMATION_SCHEMA.COLUMNS
        where   TABLE_SCHEMA = ?
        and     TABLE_NAME = ?
        order by ORDINAL_POSITION
        ",
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.iter()
        .map(|row| {
            Ok(RawColumn {
                name: row.try_get("name").map_err(db_err)?,
                default: row.try_get("column_default").map_err(db_err)?,
                is_nullable: row.try_get("is_nullable").map_err(db_err)?,
                data_type: row.try_get("data_type").map_err(db_err)?,
                max_length: get_opt_u64(row, "max_length")?,
                column_key: row.try_get("column_key").map_err(db_err)?,
                extra: row.try_get("extra").map_err(db_err)?,
            })
        })
        .collect()
}

pub struct RawForeignKey {
    pub column: String,
    pub referenced_table: String,
}

pub async fn list_foreign_keys(
    pool: &MySqlPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawForeignKey>> {
    let rows = sqlx::query(
        r"
        select  COLUMN_NAME as name,
                REFERENCED_TABLE_NAME as referenced_table
        from    INFORMATION_SCHEMA.KEY_COLUMN_USAGE
        where   TABLE_SCHEMA = ?
        and     TABLE_NAME = ?
        and     REFERENCED_TABLE_NAME is not null
        order by ORDINAL_POSITION
        ",
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.iter()
        .map(|row| {
            Ok(RawForeignKey {
                column: row.try_get("name").map_err(db_err)?,
                referenced_table: row.try_get("referenced_table").map_err(db_err)?,
            })
        })
        .collect()
}

pub struct RawUniqueColumn {
    pub constraint_name: String,
    pub column: String,
}

pub async fn list_unique_columns(
    pool: &MySqlPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawUniqueColumn>> {
    let rows = sqlx::query(
        r"
        select  tc.CONSTRAINT_NAME as constraint_name,
                kcu.COLUMN_NAME as name
        from    INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
        join    INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
        on      kcu.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA
        and     kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
        and     kcu.TABLE_NAME = tc.TABLE_NAME
        where   tc.TABLE_SCHEMA = ?
        and     tc.TABLE_NAME = ?
        and     tc.CONSTRAINT_TYPE = 'UNIQUE'
        order by tc.CONSTRAINT_NAME, kcu.ORDINAL_POSITION
        ",
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.iter()
        .map(|row| {
            Ok(RawUniqueColumn {
                constraint_name: row.try_get("constraint_name").map_err(db_err)?,
                column: row.try_get("name").map_err(db_err)?,
            })
        })
        .collect()
}

/// Distinct values currently stored in one column, encoded as collision
/// keys. Only numeric and text columns are ever seeded.
pub async fn list_column_values(
    pool: &MySqlPool,
    schema: &str,
    table: &str,
    column: &str,
    kind: ColumnKind,
) -> Result<Vec<String>> {
    let sql = format!(
        "select distinct {} as value from {}.{}",
        quote_ident(column),
        quote_ident(schema),
        quote_ident(table),
    );

    let rows = sqlx::query(&sql).fetch_all(pool).await.map_err(db_err)?;

    let mut keys = Vec::with_capacity(rows.len());
    for row in &rows {
        let value = match kind {
            ColumnKind::Integer | ColumnKind::Flag => get_numeric(row, "value")?,
            _ => row
                .try_get::<Option<String>, _>("value")
                .map_err(db_err)?
                .map(Value::Text),
        };
        if let Some(value) = value {
            keys.push(value.collision_key());
        }
    }
    Ok(keys)
}

// MySQL 5.7 reports several information_schema counters as unsigned where
// 8.0 reports them signed; accept either.
fn get_opt_u64(row: &MySqlRow, column: &str) -> Result<Option<u64>> {
    if let Ok(value) = row.try_get::<Option<u64>, _>(column) {
        return Ok(value);
    }
    row.try_get::<Option<i64>, _>(column)
        .map(|value| value.map(|v| v as u64))
        .map_err(db_err)
}

fn get_numeric(row: &MySqlRow, column: &str) -> Result<Option<Value>> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(column) {
        return Ok(value.map(Value::Int));
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(column) {
        return Ok(value.map(Value::UInt));
    }
    row.try_get::<Option<f64>, _>(column)
        .map(|value| value.map(Value::Float))
        .map_err(db_err)
}
