use chrono::{DateTime, Datelike, TimeZone, Utc};
use sqlx::{PgConnection, Row};

use crate::error::StorageError;

/// The base table every monthly child partition attaches to.
pub const PARENT_TABLE: &str = "exchange_rates";

/// A monthly partition's identity: its table name and the `[start, end)`
/// range it was created over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionWindow {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Compute the `exchange_rates_YYYY_MM` name and `[start, end)` range for
/// the first day of the month `months_ahead` months after `now`.
#[must_use]
pub fn window_for(now: DateTime<Utc>, months_ahead: u32) -> PartitionWindow {
    let total_months = now.year() as i64 * 12 + i64::from(now.month0()) + i64::from(months_ahead);
    let start_year = (total_months.div_euclid(12)) as i32;
    let start_month0 = total_months.rem_euclid(12) as u32;
    let end_total = total_months + 1;
    let end_year = (end_total.div_euclid(12)) as i32;
    let end_month0 = end_total.rem_euclid(12) as u32;

    let start = Utc
        .with_ymd_and_hms(start_year, start_month0 + 1, 1, 0, 0, 0)
        .single()
        .expect("computed year/month is always valid");
    let end = Utc
        .with_ymd_and_hms(end_year, end_month0 + 1, 1, 0, 0, 0)
        .single()
        .expect("computed year/month is always valid");

    PartitionWindow {
        name: format!("exchange_rates_{start_year:04}_{:02}", start_month0 + 1),
        start,
        end,
    }
}

/// Create the next month's partition (relative to `now`) if it doesn't
/// already exist. Re-running for a month that already has a partition is a
/// no-op, not an error.
///
/// Per the partition-boundary-race decision in the design notes, callers
/// should also create the *current* month's partition defensively on a
/// cold start, by calling this with `months_ahead = 0`.
///
/// # Errors
/// Returns [`StorageError::Database`] on any query failure.
pub async fn create_month_partition(
    conn: &mut PgConnection,
    now: DateTime<Utc>,
    months_ahead: u32,
) -> Result<bool, StorageError> {
    let window = window_for(now, months_ahead);

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM pg_tables WHERE tablename = $1)",
    )
    .bind(&window.name)
    .fetch_one(&mut *conn)
    .await?;

    if exists {
        tracing::info!(partition = %window.name, "partition already exists");
        return Ok(false);
    }

    let statement = format!(
        "CREATE TABLE {} PARTITION OF {PARENT_TABLE} FOR VALUES FROM ('{}') TO ('{}')",
        window.name,
        window.start.to_rfc3339(),
        window.end.to_rfc3339(),
    );
    sqlx::query(&statement).execute(conn).await?;
    tracing::info!(partition = %window.name, "partition created");

    Ok(true)
}

/// List every existing `exchange_rates_YYYY_MM` partition, parsed into its
/// window. Malformed names (anything not matching the naming convention)
/// are skipped rather than erroring, since a stray table that doesn't match
/// the naming convention is not this sweep's concern.
///
/// # Errors
/// Returns [`StorageError::Database`] on any query failure.
pub async fn list_partitions(conn: &mut PgConnection) -> Result<Vec<PartitionWindow>, StorageError> {
    let rows = sqlx::query(
        "SELECT tablename FROM pg_tables WHERE tablename LIKE 'exchange_rates\\_%' ORDER BY tablename",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut partitions = Vec::new();
    for row in rows {
        let name: String = row.get("tablename");
        if let Some(window) = parse_partition_name(&name) {
            partitions.push(window);
        }
    }
    Ok(partitions)
}

fn parse_partition_name(name: &str) -> Option<PartitionWindow> {
    let suffix = name.strip_prefix("exchange_rates_")?;
    let (year_str, month_str) = suffix.split_once('_')?;
    if month_str.contains('_') {
        return None;
    }
    let year: i32 = year_str.parse().ok()?;
    let month: u32 = month_str.parse().ok()?;
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
    let end_total = i64::from(year) * 12 + i64::from(month - 1) + 1;
    let end_year = (end_total.div_euclid(12)) as i32;
    let end_month = (end_total.rem_euclid(12)) as u32 + 1;
    let end = Utc.with_ymd_and_hms(end_year, end_month, 1, 0, 0, 0).single()?;

    Some(PartitionWindow {
        name: name.to_string(),
        start,
        end,
    })
}

/// Drop every partition whose start date is strictly older than
/// `retention_months` * 30 days before `now`, then `VACUUM ANALYZE` every
/// partition that remains, the parent table, and the `currencies` table.
///
/// Returns the names of the dropped partitions.
///
/// # Errors
/// Returns [`StorageError::Database`] on the first query failure. Silently
/// skipping a failed DROP/VACUUM and continuing with the rest would leave
/// retention state unclear to the caller, so this surfaces immediately
/// instead of logging and continuing.
pub async fn retention_sweep(
    conn: &mut PgConnection,
    now: DateTime<Utc>,
    retention_months: i64,
) -> Result<Vec<String>, StorageError> {
    let cutoff = now - chrono::Duration::days(retention_months * 30);
    let partitions = list_partitions(&mut *conn).await?;

    let mut dropped = Vec::new();
    for partition in &partitions {
        if partition.start < cutoff {
            let statement = format!("DROP TABLE {}", partition.name);
            sqlx::query(&statement).execute(&mut *conn).await?;
            tracing::info!(partition = %partition.name, "partition dropped past retention cutoff");
            dropped.push(partition.name.clone());
        } else {
            let statement = format!("VACUUM ANALYZE {}", partition.name);
            sqlx::query(&statement).execute(&mut *conn).await?;
        }
    }

    sqlx::query(&format!("VACUUM ANALYZE {PARENT_TABLE}"))
        .execute(&mut *conn)
        .await?;
    sqlx::query("VACUUM ANALYZE currencies").execute(conn).await?;

    Ok(dropped)
}
