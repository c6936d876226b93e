//! Rendering through a Kroki server
//!
//! Kroki renders Mermaid markup server-side: `POST {server}/mermaid/svg`
//! with the markup as a plain-text body returns the SVG document. Engine
//! settings travel in-band as an init directive in front of the markup.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use mermend::render::{self, EngineSettings, RenderEngine};
use mermend::EngineError;
use tracing::debug;
use ureq::Agent;

/// Public Kroki instance
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Create HTTP agent with the specified timeout.
///
/// Error statuses come back as responses so their bodies can be reported.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`RenderEngine`] backed by a Kroki server
#[derive(Debug, Clone)]
pub struct KrokiEngine {
    agent: Agent,
    server_url: String,
    settings: Option<EngineSettings>,
}

impl KrokiEngine {
    /// Engine for `server_url`, using the process-wide engine settings if
    /// they have been initialized.
    pub fn new(server_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
            server_url: server_url.into(),
            settings: render::settings().cloned(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/mermaid/svg", self.server_url.trim_end_matches('/'))
    }

    /// Markup as sent on the wire
    pub fn request_body(&self, markup: &str) -> String {
        match &self.settings {
            Some(settings) => format!("{}\n{}", settings.init_directive(), markup),
            None => markup.to_string(),
        }
    }
}

/// Send markup to Kroki and return the SVG body.
///
/// HTTP statuses of 400 and above carry Kroki's error text in the body,
/// which becomes the engine error message.
fn send_markup(agent: &Agent, url: &str, body: &str) -> Result<String, EngineError> {
    let response = agent
        .post(url)
        .header("Content-Type", "text/plain")
        .send(body.as_bytes())
        .map_err(|e| EngineError::new(format!("Kroki request failed: {e}")))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(EngineError::new(format!("HTTP {status}: {}", error_body.trim())));
    }

    body.read_to_string()
        .map_err(|e| EngineError::new(format!("Kroki response unreadable: {e}")))
}

impl RenderEngine for KrokiEngine {
    fn render<'a>(
        &'a self,
        element_id: &'a str,
        markup: &'a str,
    ) -> BoxFuture<'a, Result<String, EngineError>> {
        let agent = self.agent.clone();
        let url = self.endpoint();
        let body = self.request_body(markup);
        debug!(element_id, url = %url, body_len = body.len(), "Sending markup to Kroki");

        async move {
            tokio::task::spawn_blocking(move || send_markup(&agent, &url, &body))
                .await
                .map_err(|e| EngineError::new(format!("Kroki task failed: {e}")))?
        }
        .boxed()
    }
}
