use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;
use regex::Regex;
use scraper::{Html, Selector};

use crate::http::get_text;

/// Scrapes Forbes Advisor's single-pair currency converter page.
pub struct ForbesAdapter;

#[async_trait]
impl SourceAdapter for ForbesAdapter {
    fn name(&self) -> &'static str {
        "forbes"
    }

    fn capability(&self) -> Capability {
        Capability::SinglePair
    }

    async fn fetch_single(&self, ctx: &FetchContext<'_>, target_currency: &str) -> Result<f64, AdapterError> {
        let url = format!(
            "https://www.forbes.com/advisor/money-transfer/currency-converter/{}-{}/?amount=1",
            ctx.base_currency.to_lowercase(),
            target_currency.to_lowercase()
        );
        let body = get_text(ctx, &url).await?;
        parse(&body, ctx.base_currency, target_currency)
    }
}

fn parse(body: &str, base_currency: &str, target_currency: &str) -> Result<f64, AdapterError> {
    let document = Html::parse_document(body);
    let result_box_selector =
        Selector::parse("div.result-box").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let container_selector = Selector::parse("div.result-box-c1-c2")
        .map_err(|e| AdapterError::Parse(e.to_string()))?;
    let row_selector = Selector::parse("div").map_err(|e| AdapterError::Parse(e.to_string()))?;

    let result_box = document
        .select(&result_box_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("result-box not found".into()))?;
    let container = result_box
        .select(&container_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("result-box-c1-c2 not found".into()))?;
    let row = container
        .select(&row_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("conversion row not found".into()))?;

    let text: String = row.text().collect::<Vec<_>>().join(" ");
    let pattern = Regex::new(&format!(
        r"1\s*{}\s*=\s*([\d,\.]+)\s*{}",
        regex::escape(base_currency),
        regex::escape(target_currency)
    ))
    .map_err(|e| AdapterError::Parse(e.to_string()))?;

    let captures = pattern
        .captures(&text)
        .ok_or_else(|| AdapterError::Parse("conversion rate not found in text".into()))?;

    captures[1]
        .replace(',', "")
        .parse::<f64>()
        .map_err(|e| AdapterError::Parse(e.to_string()))
}
