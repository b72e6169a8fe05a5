use koel_core::{AdapterError, FetchContext};

/// Issue a GET request using the manager's shared client, rotated
/// User-Agent, and standard header set, returning the response body as
/// text. Every scraping adapter goes through this so header policy and
/// error mapping stay in one place.
pub async fn get_text(ctx: &FetchContext<'_>, url: &str) -> Result<String, AdapterError> {
    tracing::info!(url, "fetching");
    let response = ctx
        .client
        .get(url)
        .headers(ctx.headers())
        .timeout(ctx.timeout)
        .send()
        .await
        .inspect_err(|e| tracing::warn!(url, error = %e, "request failed"))?
        .error_for_status()
        .inspect_err(|e| tracing::warn!(url, error = %e, "non-2xx response"))?;
    Ok(response.text().await?)
}

/// As [`get_text`], but parses the body as JSON.
pub async fn get_json(ctx: &FetchContext<'_>, url: &str) -> Result<serde_json::Value, AdapterError> {
    tracing::info!(url, "fetching");
    let response = ctx
        .client
        .get(url)
        .headers(ctx.headers())
        .timeout(ctx.timeout)
        .send()
        .await
        .inspect_err(|e| tracing::warn!(url, error = %e, "request failed"))?
        .error_for_status()
        .inspect_err(|e| tracing::warn!(url, error = %e, "non-2xx response"))?;
    response
        .json()
        .await
        .map_err(AdapterError::from)
}

/// Parse a rate string, stripping thousands-separator commas.
pub fn parse_rate(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::{Method::GET, MockServer};

    use super::*;

    fn ctx(client: &reqwest::Client) -> FetchContext<'_> {
        FetchContext {
            base_currency: "USD",
            base_name: None,
            base_name_plural: None,
            client,
            user_agent: "koel-test/1.0",
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn get_text_sends_the_standard_header_set() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rate")
                .header("user-agent", "koel-test/1.0")
                .header("accept-language", "en-US,en;q=0.9")
                .header("connection", "keep-alive");
            then.status(200).body("0.91");
        });

        let client = reqwest::Client::new();
        let body = get_text(&ctx(&client), &server.url("/rate")).await.unwrap();

        mock.assert();
        assert_eq!(body, "0.91");
    }

    #[tokio::test]
    async fn get_json_parses_the_response_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rate.json");
            then.status(200).json_body(serde_json::json!({"rate": 0.91}));
        });

        let client = reqwest::Client::new();
        let body = get_json(&ctx(&client), &server.url("/rate.json")).await.unwrap();

        assert_eq!(body["rate"].as_f64(), Some(0.91));
    }

    #[tokio::test]
    async fn non_2xx_status_is_mapped_to_an_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let client = reqwest::Client::new();
        let err = get_text(&ctx(&client), &server.url("/missing")).await.unwrap_err();

        assert!(matches!(err, AdapterError::Http(_)));
    }

    #[test]
    fn parse_rate_strips_thousands_separators() {
        assert_eq!(parse_rate("1,234.56"), Some(1234.56));
        assert_eq!(parse_rate("  89.1  "), Some(89.1));
        assert_eq!(parse_rate("not-a-number"), None);
    }
}
