use chrono::{DateTime, Utc};
use koel_types::ExchangeRate;
use sqlx::{PgConnection, PgPool};

use crate::error::StorageError;

/// Bulk-upsert a batch of rate observations in a single statement, using
/// Postgres's `UNNEST`-over-arrays idiom to bind the whole batch at once
/// rather than issuing one statement per row.
///
/// Conflicts on the natural key `(base_currency_id, target_currency_id,
/// created_at)` update `rate` and `source` in place rather than erroring.
///
/// Operates over a borrowed connection — a bare `&mut PgConnection` or a
/// `Transaction` via `Deref` — so it never owns the commit/rollback
/// decision. See [`upsert_rates_committing`] for the call-site wrapper that
/// opens and commits its own transaction.
///
/// # Errors
/// Returns [`StorageError::Invariant`] if any rate violates `base_id !=
/// target_id` or `rate > 0.0`, or [`StorageError::Database`] on query
/// failure.
pub async fn upsert_rates(
    conn: &mut PgConnection,
    rates: &[ExchangeRate],
) -> Result<u64, StorageError> {
    if rates.is_empty() {
        return Ok(0);
    }

    validate(rates)?;

    let base_ids: Vec<i32> = rates.iter().map(|r| r.base_currency_id).collect();
    let target_ids: Vec<i32> = rates.iter().map(|r| r.target_currency_id).collect();
    let values: Vec<f64> = rates.iter().map(|r| r.rate).collect();
    let sources: Vec<String> = rates.iter().map(|r| r.source.clone()).collect();
    let created_ats: Vec<DateTime<Utc>> = rates.iter().map(|r| r.created_at).collect();

    let result = sqlx::query(
        "INSERT INTO exchange_rates (base_currency_id, target_currency_id, rate, source, created_at) \
         SELECT * FROM UNNEST($1::int[], $2::int[], $3::float8[], $4::varchar[], $5::timestamptz[]) \
         ON CONFLICT (base_currency_id, target_currency_id, created_at) \
         DO UPDATE SET rate = EXCLUDED.rate, source = EXCLUDED.source",
    )
    .bind(&base_ids)
    .bind(&target_ids)
    .bind(&values)
    .bind(&sources)
    .bind(&created_ats)
    .execute(conn)
    .await?;

    tracing::info!(batch_size = rates.len(), rows_affected = result.rows_affected(), "rates upserted");
    Ok(result.rows_affected())
}

/// Check the domain invariants in `koel_types::ExchangeRate`'s docs before
/// any of a batch reaches the database.
fn validate(rates: &[ExchangeRate]) -> Result<(), StorageError> {
    for rate in rates {
        if rate.base_currency_id == rate.target_currency_id {
            return Err(StorageError::Invariant(format!(
                "base and target currency ids are both {}",
                rate.base_currency_id
            )));
        }
        if !(rate.rate > 0.0) {
            return Err(StorageError::Invariant(format!(
                "rate {} is not strictly positive",
                rate.rate
            )));
        }
    }
    Ok(())
}

/// Call-site wrapper for single-step callers (e.g. a single-currency retry
/// job): opens a transaction, upserts, commits. A multi-base full/group
/// sweep instead calls [`upsert_rates`] directly against its own
/// already-open transaction, so every base's batch and the final commit
/// share one database round trip.
///
/// # Errors
/// Returns [`StorageError`] from the upsert, or from the transaction
/// begin/commit. The transaction is rolled back automatically if the upsert
/// fails (sqlx's `Transaction::drop` rolls back when not committed).
pub async fn upsert_rates_committing(
    pool: &PgPool,
    rates: &[ExchangeRate],
) -> Result<u64, StorageError> {
    let mut txn = pool.begin().await?;
    let affected = upsert_rates(&mut txn, rates).await?;
    txn.commit().await?;
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_rate() -> ExchangeRate {
        ExchangeRate {
            base_currency_id: 1,
            target_currency_id: 2,
            rate: 0.9,
            source: "trading-economics".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn accepts_a_well_formed_batch() {
        assert!(validate(&[sample_rate()]).is_ok());
    }

    #[test]
    fn rejects_self_referential_rate() {
        let mut rate = sample_rate();
        rate.target_currency_id = rate.base_currency_id;
        let err = validate(&[rate]).unwrap_err();
        assert!(matches!(err, StorageError::Invariant(_)));
    }

    #[test]
    fn rejects_non_positive_rate() {
        let mut rate = sample_rate();
        rate.rate = 0.0;
        let err = validate(&[rate]).unwrap_err();
        assert!(matches!(err, StorageError::Invariant(_)));

        let mut negative = sample_rate();
        negative.rate = -1.5;
        assert!(validate(&[negative]).is_err());
    }
}
