use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;
use scraper::{Html, Selector};

use crate::http::get_text;

static PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"1\s+\w+\s*=\s*([\d.,]+)\s*(\w+)").expect("valid regex"));

/// Scrapes currencyconverter.org.uk's "Remaining" currencies table. Requires
/// the base currency's plural display name to build the URL slug.
pub struct CurrencyConverterAdapter;

#[async_trait]
impl SourceAdapter for CurrencyConverterAdapter {
    fn name(&self) -> &'static str {
        "currency-converter-org-uk"
    }

    fn capability(&self) -> Capability {
        Capability::MultiPair
    }

    fn needs_base_plural(&self) -> bool {
        true
    }

    async fn fetch_multi(&self, ctx: &FetchContext<'_>) -> Result<BTreeMap<String, f64>, AdapterError> {
        let base_name_plural = ctx
            .base_name_plural
            .ok_or(AdapterError::MissingParameter("base_name_plural"))?;
        let plural_name = base_name_plural
            .split_whitespace()
            .next_back()
            .unwrap_or(base_name_plural)
            .to_lowercase();
        let url = format!(
            "https://www.currencyconverter.org.uk/convert-{}/convert-{plural_name}.html",
            ctx.base_currency
        );
        let body = get_text(ctx, &url).await?;
        parse(&body)
    }
}

fn parse(body: &str) -> Result<BTreeMap<String, f64>, AdapterError> {
    let document = Html::parse_document(body);
    let table_selector =
        Selector::parse("table.currencies").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let row_selector = Selector::parse("tr").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let cell_selector = Selector::parse("td").map_err(|e| AdapterError::Parse(e.to_string()))?;

    let tables: Vec<_> = document.select(&table_selector).collect();
    let second_table = tables
        .get(1)
        .ok_or_else(|| AdapterError::Parse("second currencies table not found".into()))?;

    let mut rates = BTreeMap::new();
    for row in second_table.select(&row_selector).skip(1) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        let Some(cell) = cells.get(1) else {
            continue;
        };
        let text: String = cell.text().collect::<Vec<_>>().join(" ");
        let Some(captures) = PATTERN.captures(&text) else {
            continue;
        };
        let Ok(rate) = captures[1].replace(',', "").parse::<f64>() else {
            continue;
        };
        rates.insert(captures[2].to_string(), rate);
    }

    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_second_table_rows() {
        let html = r#"
            <table class="currencies"><tr><td>header</td></tr></table>
            <table class="currencies">
                <tr><td>h</td><td>h</td></tr>
                <tr><td>flag</td><td>1 Pound = 114.12 ALL</td></tr>
            </table>
        "#;
        let rates = parse(html).unwrap();
        assert_eq!(rates.get("ALL"), Some(&114.12));
    }
}
