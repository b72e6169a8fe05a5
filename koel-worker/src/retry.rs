use std::sync::Arc;

use crate::orchestrator::{is_escalation_candidate, Orchestrator};

/// At most this many attempts of an entire sweep job are made when the
/// job itself fails outright (a dropped connection, a scheduler error),
/// as distinct from individual currencies failing within an otherwise
/// complete sweep, which `run_retry_chain` handles instead.
pub const MAX_ORCHESTRATOR_RETRIES: u32 = 3;

/// Runs the two-tier retry chain for one failed base currency: wait
/// `retry_backoff_single_currency`, retry once; if that retry itself fails
/// with `AllSourcesFailed`, wait `retry_backoff_single_source` and retry a
/// second and final time.
///
/// Spawned as a detached task per failed currency rather than awaited
/// inline, so a sweep job's completion doesn't block on every retry's
/// backoff window.
pub async fn run_retry_chain(orchestrator: Arc<Orchestrator>, parent_job_id: String, base_code: String) {
    let config = orchestrator.config().clone();
    tokio::time::sleep(config.retry_backoff_single_currency()).await;

    let retry_job_id = format!("single_currency_retry_{parent_job_id}_{base_code}");
    match orchestrator.single_currency_retry(&retry_job_id, &base_code).await {
        Ok(rows_written) => {
            tracing::info!(job_id = %retry_job_id, base = %base_code, rows_written, "single-currency retry succeeded");
        }
        Err(err) if is_escalation_candidate(&err) => {
            tracing::warn!(job_id = %retry_job_id, base = %base_code, "retry failed again, escalating");
            tokio::time::sleep(config.retry_backoff_single_source()).await;

            let escalation_job_id = format!("single_source_escalation_{parent_job_id}_{base_code}");
            if let Err(err) = orchestrator.single_currency_retry(&escalation_job_id, &base_code).await {
                tracing::error!(job_id = %escalation_job_id, base = %base_code, error = %err, "escalation retry failed, giving up");
            }
        }
        Err(err) => {
            tracing::error!(job_id = %retry_job_id, base = %base_code, error = %err, "single-currency retry failed non-recoverably");
        }
    }
}

/// Runs a group sweep, retrying the whole job up to [`MAX_ORCHESTRATOR_RETRIES`]
/// times with `retry_backoff_single_currency` between attempts when the
/// sweep itself returns an error (as opposed to completing with some
/// currencies simply failed, which is reported in the returned summary and
/// handled per-currency by [`run_retry_chain`]). Returns `None` once every
/// attempt has failed.
pub async fn run_group_sweep_with_retries(
    orchestrator: Arc<Orchestrator>,
    job_kind: &str,
    group: crate::orchestrator::CurrencyGroup,
) -> Option<(String, crate::orchestrator::SweepSummary)> {
    let backoff = orchestrator.config().retry_backoff_single_currency();

    for attempt in 0..=MAX_ORCHESTRATOR_RETRIES {
        let job_id = format!("{job_kind}_{}_attempt{attempt}", chrono::Utc::now().format("%Y%m%d%H%M%S"));
        match orchestrator.group_sweep(&job_id, group).await {
            Ok(summary) => return Some((job_id, summary)),
            Err(err) if attempt < MAX_ORCHESTRATOR_RETRIES => {
                tracing::warn!(job_id = %job_id, attempt, error = %err, "group sweep failed unexpectedly, retrying");
                tokio::time::sleep(backoff).await;
            }
            Err(err) => {
                tracing::error!(job_id = %job_id, attempt, error = %err, "group sweep exhausted its retries");
                return None;
            }
        }
    }
    None
}
