//! Outbound delivery of mirrored steps.

use reqwest::Client;
use tracing::error;

use crate::error::Result;
use crate::event::StepPayload;

const STEPS_PATH: &str = "/chat/steps";
const DISABLE_SYSTEM_PROXY_ENV: &str = "STEPRELAY_DISABLE_SYSTEM_PROXY";

/// HTTP sink receiving mirrored step payloads.
#[derive(Debug, Clone)]
pub struct StepSink {
    url: String,
}

impl StepSink {
    /// Build a sink from the configured collector base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            url: format!("{}{}", base_url.trim_end_matches('/'), STEPS_PATH),
        }
    }

    /// Full endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver one payload.
    ///
    /// The client lives for this single request. The response is accepted
    /// without inspection; no retry, no timeout beyond transport defaults.
    pub async fn deliver(&self, payload: &StepPayload) -> Result<()> {
        let client = build_client();
        client.post(&self.url).json(payload).send().await?;
        Ok(())
    }

    /// Fire-and-forget delivery on an unsupervised task.
    ///
    /// Transport failures are logged and swallowed; the caller never
    /// observes sink outcome.
    pub fn dispatch(&self, payload: StepPayload) {
        let sink = self.clone();
        tokio::spawn(async move {
            if let Err(error) = sink.deliver(&payload).await {
                error!(url = %sink.url, %error, "failed to mirror step");
            }
        });
    }
}

fn build_client() -> Client {
    if should_disable_system_proxy() {
        Client::builder()
            .no_proxy()
            .build()
            .expect("Failed to build reqwest client")
    } else {
        Client::new()
    }
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_appended_to_trimmed_base() {
        let sink = StepSink::new("http://localhost:8000");
        assert_eq!(sink.url(), "http://localhost:8000/chat/steps");

        let sink = StepSink::new("http://localhost:8000/");
        assert_eq!(sink.url(), "http://localhost:8000/chat/steps");
    }
}
