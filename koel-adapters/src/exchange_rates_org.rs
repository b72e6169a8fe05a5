use std::collections::BTreeMap;

use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;
use scraper::{Html, Selector};

use crate::http::{get_text, parse_rate};

/// Scrapes exchangerates.org.uk's per-base conversion table. Requires the
/// base currency's full display name to build the URL slug.
pub struct ExchangeRatesOrgAdapter;

#[async_trait]
impl SourceAdapter for ExchangeRatesOrgAdapter {
    fn name(&self) -> &'static str {
        "exchange-rates-org-uk"
    }

    fn capability(&self) -> Capability {
        Capability::MultiPair
    }

    fn needs_base_name(&self) -> bool {
        true
    }

    async fn fetch_multi(&self, ctx: &FetchContext<'_>) -> Result<BTreeMap<String, f64>, AdapterError> {
        let base_name = ctx
            .base_name
            .ok_or(AdapterError::MissingParameter("base_name"))?;
        let slug: String = base_name
            .split_whitespace()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join("-");
        let url = format!(
            "https://www.exchangerates.org.uk/{slug}-{}-currency-table.html",
            ctx.base_currency
        );
        let body = get_text(ctx, &url).await?;
        parse(&body)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn parse(body: &str) -> Result<BTreeMap<String, f64>, AdapterError> {
    let document = Html::parse_document(body);
    let container_selector = Selector::parse("div.mobilescrollbars")
        .map_err(|e| AdapterError::Parse(e.to_string()))?;
    let table_selector =
        Selector::parse("table.currencypage-mini").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let row_selector = Selector::parse("tr.colone, tr.coltwo")
        .map_err(|e| AdapterError::Parse(e.to_string()))?;
    let cell_selector = Selector::parse("td").map_err(|e| AdapterError::Parse(e.to_string()))?;
    let link_selector = Selector::parse("a").map_err(|e| AdapterError::Parse(e.to_string()))?;

    let mut rates = BTreeMap::new();
    let mut saw_container = false;

    for container in document.select(&container_selector) {
        saw_container = true;
        let Some(table) = container.select(&table_selector).next() else {
            continue;
        };
        for row in table.select(&row_selector) {
            let cells: Vec<_> = row.select(&cell_selector).collect();
            if cells.len() < 5 {
                continue;
            }
            let Some(link) = cells[3].select(&link_selector).next() else {
                continue;
            };
            let target = link
                .value()
                .attr("href")
                .and_then(extract_target_code)
                .unwrap_or_else(|| link.text().collect::<String>().trim().to_uppercase());

            let rate_text: String = cells[4].text().collect();
            if let Some(rate) = parse_rate(&rate_text) {
                rates.insert(target, rate);
            }
        }
    }

    if !saw_container {
        return Err(AdapterError::Parse("mobilescrollbars div not found".into()));
    }

    Ok(rates)
}

/// Pull the target currency code out of a link such as
/// `/Some-Currency-XYZ-currency-table.html`.
fn extract_target_code(href: &str) -> Option<String> {
    let suffix = href.strip_suffix("-currency-table.html")?;
    let code = suffix.rsplit('-').next()?;
    if (2..=4).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_uppercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_each_word_for_the_url_slug() {
        assert_eq!(capitalize("dollar"), "Dollar");
    }

    #[test]
    fn parse_extracts_rates_from_conversion_rows() {
        let html = r#"
            <div class="mobilescrollbars">
                <table class="currencypage-mini">
                    <tr class="colone">
                        <td>flag</td><td>AED</td><td>flag</td>
                        <td><a href="/United-Arab-Emirates-Dirham-EUR-currency-table.html">Euro</a></td>
                        <td><b>0.92</b></td>
                    </tr>
                </table>
            </div>
        "#;
        let rates = parse(html).unwrap();
        assert_eq!(rates.get("EUR"), Some(&0.92));
    }
}
