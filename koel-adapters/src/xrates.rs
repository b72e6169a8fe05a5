use std::collections::BTreeMap;

use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;
use scraper::{Html, Selector};

use crate::http::{get_text, parse_rate};

/// Scrapes x-rates.com's per-base conversion table.
pub struct XRatesAdapter;

#[async_trait]
impl SourceAdapter for XRatesAdapter {
    fn name(&self) -> &'static str {
        "x-rates"
    }

    fn capability(&self) -> Capability {
        Capability::MultiPair
    }

    async fn fetch_multi(&self, ctx: &FetchContext<'_>) -> Result<BTreeMap<String, f64>, AdapterError> {
        let url = format!("https://www.x-rates.com/table/?from={}&amount=1", ctx.base_currency);
        let body = get_text(ctx, &url).await?;
        parse(&body)
    }
}

fn parse(body: &str) -> Result<BTreeMap<String, f64>, AdapterError> {
    let document = Html::parse_document(body);
    let table_selector =
        Selector::parse("table.tablesorter.ratesTable").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let row_selector = Selector::parse("tr").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let cell_selector = Selector::parse("td").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let link_selector = Selector::parse("a").map_err(|e| AdapterError::Parse(e.to_string()))?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("ratesTable not found".into()))?;

    let mut rates = BTreeMap::new();
    for row in table.select(&row_selector).skip(1) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        let Some(cell) = cells.get(1) else {
            continue;
        };
        let Some(link) = cell.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(to_param) = href.split("to=").nth(1).and_then(|s| s.split('&').next()) else {
            continue;
        };

        let rate_text: String = link.text().collect();
        if let Some(rate) = parse_rate(&rate_text) {
            rates.insert(to_param.to_string(), rate);
        }
    }

    Ok(rates)
}
