use async_trait::async_trait;
use koel_core::{AdapterError, FetchContext, SourceAdapter};
use koel_types::Capability;

use crate::http::get_json;

/// Queries the hexarate.paikama.co JSON API for a single pair's mid rate.
pub struct HexaRateAdapter;

#[async_trait]
impl SourceAdapter for HexaRateAdapter {
    fn name(&self) -> &'static str {
        "hexa-rate"
    }

    fn capability(&self) -> Capability {
        Capability::SinglePair
    }

    async fn fetch_single(&self, ctx: &FetchContext<'_>, target_currency: &str) -> Result<f64, AdapterError> {
        let url = format!(
            "https://hexarate.paikama.co/api/rates/latest/{}?target={target_currency}",
            ctx.base_currency
        );
        let body = get_json(ctx, &url).await?;
        body["data"]["mid"]
            .as_f64()
            .ok_or_else(|| AdapterError::MissingField("data.mid".into()))
    }
}
