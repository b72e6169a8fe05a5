use std::collections::BTreeMap;

use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;
use scraper::{Html, Selector};

use crate::http::{get_text, parse_rate};

/// Scrapes tradingeconomics.com's currency heatmap table, which lists every
/// pair quoted against a given base in one page.
pub struct TradingEconomicsAdapter;

#[async_trait]
impl SourceAdapter for TradingEconomicsAdapter {
    fn name(&self) -> &'static str {
        "trading-economics"
    }

    fn capability(&self) -> Capability {
        Capability::MultiPair
    }

    async fn fetch_multi(&self, ctx: &FetchContext<'_>) -> Result<BTreeMap<String, f64>, AdapterError> {
        let url = format!("https://tradingeconomics.com/currencies?base={}", ctx.base_currency);
        let body = get_text(ctx, &url).await?;
        parse(&body, ctx.base_currency)
    }
}

fn parse(body: &str, base_currency: &str) -> Result<BTreeMap<String, f64>, AdapterError> {
    let document = Html::parse_document(body);
    let table_selector = Selector::parse("table.table-heatmap")
        .map_err(|e| AdapterError::Parse(e.to_string()))?;
    let row_selector = Selector::parse("tbody tr").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let cell_selector = Selector::parse("td").map_err(|e| AdapterError::Parse(e.to_string()))?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| AdapterError::Parse("table.table-heatmap not found".into()))?;

    let mut rates = BTreeMap::new();

    for row in table.select(&row_selector) {
        let Some(symbol) = row.value().attr("data-symbol") else {
            continue;
        };
        let pair = symbol.split(':').next().unwrap_or(symbol);
        let target = pair.strip_prefix(base_currency).unwrap_or(pair);

        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() < 2 {
            continue;
        }
        let rate_text: String = cells[1].text().collect();
        if let Some(rate) = parse_rate(&rate_text) {
            rates.insert(target.to_string(), rate);
        }
    }

    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_heatmap_rows_and_strips_base_prefix() {
        let html = r#"
            <table class="table-heatmap">
                <tbody>
                    <tr data-symbol="USDEUR:CUR"><td>Euro</td><td>0.9123</td></tr>
                    <tr data-symbol="USDGBP:CUR"><td>Pound</td><td>1,234.56</td></tr>
                    <tr><td>no symbol</td><td>1.0</td></tr>
                </tbody>
            </table>
        "#;
        let rates = parse(html, "USD").unwrap();
        assert_eq!(rates.get("EUR"), Some(&0.9123));
        assert_eq!(rates.get("GBP"), Some(&1234.56));
        assert_eq!(rates.len(), 2);
    }
}
