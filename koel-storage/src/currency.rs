use koel_types::Currency;
use sqlx::{PgConnection, Row};

use crate::error::StorageError;

fn from_row(row: sqlx::postgres::PgRow) -> Currency {
    Currency {
        id: row.get("id"),
        code: row.get("code"),
        name: row.get("name"),
        name_plural: row.get("name_plural"),
        symbol: row.get("symbol"),
        decimal_digits: row.get("decimal_digits"),
        icon: row.get("icon"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Load every currency in the catalog, ordered by code.
///
/// # Errors
/// Returns [`StorageError::Database`] on any query failure.
pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<Currency>, StorageError> {
    let rows = sqlx::query(
        "SELECT id, code, name, name_plural, symbol, decimal_digits, icon, created_at, updated_at \
         FROM currencies ORDER BY code",
    )
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(from_row).collect())
}

/// Load the subset of currencies whose code is in `codes`. Unknown codes are
/// silently absent from the result rather than erroring, so a group sweep
/// whose configured codes don't all exist yet simply scrapes what it can.
///
/// # Errors
/// Returns [`StorageError::Database`] on any query failure.
pub async fn list_by_codes(
    conn: &mut PgConnection,
    codes: &[String],
) -> Result<Vec<Currency>, StorageError> {
    let rows = sqlx::query(
        "SELECT id, code, name, name_plural, symbol, decimal_digits, icon, created_at, updated_at \
         FROM currencies WHERE code = ANY($1) ORDER BY code",
    )
    .bind(codes)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(from_row).collect())
}

/// Look up a single currency by its surrogate id.
///
/// # Errors
/// Returns [`StorageError::Database`] on any query failure, including "not found"
/// (surfaced as [`sqlx::Error::RowNotFound`]).
pub async fn get_by_id(conn: &mut PgConnection, id: i32) -> Result<Currency, StorageError> {
    let row = sqlx::query(
        "SELECT id, code, name, name_plural, symbol, decimal_digits, icon, created_at, updated_at \
         FROM currencies WHERE id = $1",
    )
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(from_row(row))
}

/// Idempotent upsert-by-code, used by the catalog seeder. Inserting a code
/// that already exists updates its descriptive fields but leaves `id` and
/// `created_at` untouched.
///
/// # Errors
/// Returns [`StorageError::Database`] on any query failure.
pub async fn upsert_by_code(
    conn: &mut PgConnection,
    code: &str,
    name: &str,
    name_plural: Option<&str>,
    symbol: &str,
    decimal_digits: i32,
) -> Result<(), StorageError> {
    let code = Currency::canonical_code(code);
    sqlx::query(
        "INSERT INTO currencies (code, name, name_plural, symbol, decimal_digits, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
         ON CONFLICT (code) DO UPDATE SET \
            name = EXCLUDED.name, \
            name_plural = EXCLUDED.name_plural, \
            symbol = EXCLUDED.symbol, \
            decimal_digits = EXCLUDED.decimal_digits, \
            updated_at = NOW()",
    )
    .bind(&code)
    .bind(name)
    .bind(name_plural)
    .bind(symbol)
    .bind(decimal_digits)
    .execute(conn)
    .await?;

    Ok(())
}
