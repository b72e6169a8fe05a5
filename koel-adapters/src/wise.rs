use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;
use scraper::{Html, Selector};

use crate::http::get_text;

/// Scrapes the headline rate off wise.com's currency-converter chart page.
pub struct WiseAdapter;

#[async_trait]
impl SourceAdapter for WiseAdapter {
    fn name(&self) -> &'static str {
        "wise"
    }

    fn capability(&self) -> Capability {
        Capability::SinglePair
    }

    async fn fetch_single(&self, ctx: &FetchContext<'_>, target_currency: &str) -> Result<f64, AdapterError> {
        let url = format!(
            "https://wise.com/currency-converter/{}-to-{}/chart",
            ctx.base_currency.to_lowercase(),
            target_currency.to_lowercase()
        );
        let body = get_text(ctx, &url).await?;
        parse(&body)
    }
}

fn parse(body: &str) -> Result<f64, AdapterError> {
    let document = Html::parse_document(body);
    let wrapper_selector =
        Selector::parse("div.tapestry-wrapper").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let heading_selector =
        Selector::parse("h3.cc__source-to-target").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let rate_selector =
        Selector::parse("span.text-success").map_err(|e| AdapterError::Parse(e.to_string()))?;

    let wrapper = document
        .select(&wrapper_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("tapestry-wrapper not found".into()))?;
    let heading = wrapper
        .select(&heading_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("cc__source-to-target heading not found".into()))?;
    let rate_span = heading
        .select(&rate_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("rate span not found".into()))?;

    let text: String = rate_span.text().collect::<String>().trim().to_string();
    text.parse::<f64>()
        .map_err(|e| AdapterError::Parse(e.to_string()))
}
