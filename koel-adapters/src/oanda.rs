use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;

use crate::http::get_json;

/// Queries OANDA's public chart-data API for a single pair's mid rate,
/// averaging the last reported bid/ask entry over the trailing day.
pub struct OandaAdapter;

#[async_trait]
impl SourceAdapter for OandaAdapter {
    fn name(&self) -> &'static str {
        "oanda"
    }

    fn capability(&self) -> Capability {
        Capability::SinglePair
    }

    async fn fetch_single(&self, ctx: &FetchContext<'_>, target_currency: &str) -> Result<f64, AdapterError> {
        let now = Utc::now();
        let yesterday = now - ChronoDuration::days(1);
        let url = format!(
            "https://fxds-public-exchange-rates-api.oanda.com/cc-api/currencies?base={}&quote={target_currency}&data_type=chart&start_date={}&end_date={}",
            ctx.base_currency,
            yesterday.format("%Y-%m-%d"),
            now.format("%Y-%m-%d"),
        );
        let body = get_json(ctx, &url).await?;
        parse(&body)
    }
}

fn parse(body: &serde_json::Value) -> Result<f64, AdapterError> {
    let responses = body["responses"]
        .as_array()
        .ok_or_else(|| AdapterError::MissingField("responses".into()))?;
    if responses.is_empty() {
        return Err(AdapterError::MissingField("responses".into()));
    }

    let last = responses
        .last()
        .expect("checked non-empty above");
    let bid = last["average_bid"]
        .as_f64()
        .ok_or_else(|| AdapterError::MissingField("average_bid".into()))?;
    let ask = last["average_ask"]
        .as_f64()
        .ok_or_else(|| AdapterError::MissingField("average_ask".into()))?;

    Ok((bid + ask) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_bid_and_ask_of_the_last_response() {
        let body = serde_json::json!({
            "responses": [
                {"average_bid": 0.90, "average_ask": 0.92},
                {"average_bid": 0.91, "average_ask": 0.93},
            ]
        });
        assert_eq!(parse(&body).unwrap(), 0.92);
    }

    #[test]
    fn rejects_empty_responses() {
        let body = serde_json::json!({"responses": []});
        assert!(parse(&body).is_err());
    }
}
