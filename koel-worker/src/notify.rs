use std::sync::Arc;

use serde_json::json;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Posts every `ERROR`-level event to a configured webhook as a
/// vendor-neutral HTTP sink. Registered as an extra
/// `tracing_subscriber::Layer` alongside the `fmt` layer; when no webhook
/// URL is configured this layer is simply never constructed; it never
/// gates or slows down the primary log path since delivery happens on a
/// detached task.
pub struct NotifyLayer {
    client: reqwest::Client,
    webhook_url: Arc<str>,
}

impl NotifyLayer {
    #[must_use]
    pub fn new(webhook_url: impl Into<Arc<str>>) -> Self {
        Self { client: reqwest::Client::new(), webhook_url: webhook_url.into() }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for NotifyLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let payload = json!({
            "text": format!("[{}] {}", event.metadata().target(), visitor.message),
        });
        let client = self.client.clone();
        let url = self.webhook_url.clone();

        tokio::spawn(async move {
            if let Err(error) = client.post(url.as_ref()).json(&payload).send().await {
                eprintln!("notify webhook delivery failed: {error}");
            }
        });
    }
}
