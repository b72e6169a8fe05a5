use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;
use scraper::{Html, Selector};

use crate::http::get_text;

/// Pulls the quoted "last" price out of fxempire.com's embedded Next.js
/// hydration payload (`__NEXT_DATA__`) rather than any visible DOM text,
/// since the page renders the rate client-side from that data.
pub struct FxEmpireAdapter;

#[async_trait]
impl SourceAdapter for FxEmpireAdapter {
    fn name(&self) -> &'static str {
        "fx_empire"
    }

    fn capability(&self) -> Capability {
        Capability::SinglePair
    }

    async fn fetch_single(&self, ctx: &FetchContext<'_>, target_currency: &str) -> Result<f64, AdapterError> {
        let url = format!(
            "https://www.fxempire.com/currencies/{}-{}",
            ctx.base_currency.to_lowercase(),
            target_currency.to_lowercase()
        );
        let body = get_text(ctx, &url).await?;
        let instrument_key = format!(
            "{}-{}",
            ctx.base_currency.to_lowercase(),
            target_currency.to_lowercase()
        );
        parse(&body, &instrument_key)
    }
}

fn parse(body: &str, instrument_key: &str) -> Result<f64, AdapterError> {
    let document = Html::parse_document(body);
    let script_selector =
        Selector::parse("script#__NEXT_DATA__").map_err(|e| AdapterError::Parse(e.to_string()))?;

    let script = document
        .select(&script_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("__NEXT_DATA__ script not found".into()))?;
    let raw_json: String = script.text().collect();

    let json: serde_json::Value =
        serde_json::from_str(&raw_json).map_err(|e| AdapterError::Parse(e.to_string()))?;

    let queries = json["props"]["pageProps"]["dehydratedState"]["queries"]
        .as_array()
        .ok_or_else(|| AdapterError::MissingField("props.pageProps.dehydratedState.queries".into()))?;

    for query in queries {
        let state_data = &query["state"]["data"];
        if state_data["statusCode"].as_i64() != Some(200) {
            continue;
        }
        if let Some(price) = state_data["data"]["prices"][instrument_key]["last"].as_f64() {
            return Ok(price);
        }
    }

    Err(AdapterError::MissingField(format!(
        "conversion rate for {instrument_key}"
    )))
}
