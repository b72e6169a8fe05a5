use std::sync::LazyLock;

use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;
use regex::Regex;
use scraper::{Html, Selector};

use crate::http::get_text;

static RATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d.]+").expect("valid regex"));

/// Scrapes xe.com's currency-converter result panel.
pub struct XeAdapter;

#[async_trait]
impl SourceAdapter for XeAdapter {
    fn name(&self) -> &'static str {
        "xe"
    }

    fn capability(&self) -> Capability {
        Capability::SinglePair
    }

    async fn fetch_single(&self, ctx: &FetchContext<'_>, target_currency: &str) -> Result<f64, AdapterError> {
        let url = format!(
            "https://www.xe.com/currencyconverter/convert/?Amount=1&From={}&To={target_currency}",
            ctx.base_currency
        );
        let body = get_text(ctx, &url).await?;
        parse(&body)
    }
}

fn parse(body: &str) -> Result<f64, AdapterError> {
    let document = Html::parse_document(body);
    let conversion_selector = Selector::parse(r#"div[data-testid="conversion"]"#)
        .map_err(|e| AdapterError::Parse(e.to_string()))?;
    let result_selector =
        Selector::parse("p").map_err(|e| AdapterError::Parse(e.to_string()))?;

    let conversion = document
        .select(&conversion_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("conversion container not found".into()))?;
    let result_p = conversion
        .select(&result_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("result paragraph not found".into()))?;

    let text: String = result_p.text().collect();
    let matched = RATE_PATTERN
        .find(&text)
        .ok_or_else(|| AdapterError::Parse("no numeric rate in result text".into()))?;

    matched
        .as_str()
        .parse::<f64>()
        .map_err(|e| AdapterError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_rate_from_merged_digit_spans() {
        let html = r#"
            <div data-testid="conversion">
                <p>0.91<span class="faded-digits">23</span></p>
            </div>
        "#;
        assert_eq!(parse(html).unwrap(), 0.9123);
    }
}
