//! Request client for the local inference server.
//!
//! The single network call sits behind a narrow [`Transport`] trait so the
//! client logic can be driven against a fake transport in tests, without a
//! real server.

use crate::config::{Config, KEEP_ALIVE, SamplingOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Shown in place of reply text when the server answers without any.
pub const NO_RESPONSE: &str = "No response received.";

/// Failures of a single request.
///
/// The display text of each variant is what the user sees as the
/// invocation's result, so it is phrased for people, not logs.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request timed out. Please try again.")]
    TimedOut,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Error from server: {0}")]
    Server(String),
    #[error(
        "Failed to decode the response. Please check the API response format. Raw response: {raw}"
    )]
    MalformedResponse { raw: String },
}

/// Raw HTTP outcome handed back by a transport.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Narrow capability for issuing the single POST.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a POST with a JSON body and returns the status and body text.
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply, RequestError>;
}

/// Transport backed by reqwest. One request per process, no retries.
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply, RequestError> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(HttpReply { status, body })
    }
}

fn classify(error: reqwest::Error) -> RequestError {
    if error.is_timeout() {
        RequestError::TimedOut
    } else {
        RequestError::Transport(error.to_string())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    keep_alive: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a SamplingOptions>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    context: Option<Value>,
    error: Option<String>,
}

/// Successful outcome of a request.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Reply text, or the no-response sentinel when the server sent none.
    pub text: String,
    /// Opaque conversation token to thread into the next call, if any.
    pub context: Option<Value>,
}

/// Client for the server's `/api/generate` endpoint.
pub struct OllamaClient {
    config: Config,
    transport: Box<dyn Transport>,
}

impl OllamaClient {
    pub fn new(config: &Config) -> Self {
        Self::with_transport(config, Box::new(ReqwestTransport::new(config.timeout)))
    }

    pub fn with_transport(config: &Config, transport: Box<dyn Transport>) -> Self {
        Self {
            config: config.clone(),
            transport,
        }
    }

    /// Issues the invocation's single request and interprets the reply.
    ///
    /// Optional payload fields are included only when present; an empty
    /// set of sampling parameters omits the whole `options` object.
    pub async fn send(
        &self,
        prompt: &str,
        system: Option<&str>,
        context: Option<&Value>,
    ) -> Result<Reply, RequestError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            keep_alive: KEEP_ALIVE,
            system,
            context,
            options: if self.config.options.is_empty() {
                None
            } else {
                Some(&self.config.options)
            },
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| RequestError::Transport(format!("failed to encode the request: {}", e)))?;

        let url = endpoint(&self.config.host);
        debug!("POST {}", url);
        // Full payloads are echoed only when the debug toggle itself is on;
        // raising the log level alone keeps the one-line summaries.
        if self.config.debug {
            debug!("request payload {}", body);
        }
        let reply = self.transport.post_json(&url, &body).await?;
        debug!("response status {} ({} bytes)", reply.status, reply.body.len());
        if self.config.debug {
            debug!("raw response {}", reply.body);
        }

        interpret(reply)
    }
}

/// Maps an HTTP reply onto the error taxonomy. A server-reported error field
/// wins over the HTTP status; an empty success body counts as a reply with
/// no text, not a failure.
fn interpret(reply: HttpReply) -> Result<Reply, RequestError> {
    let ok = (200..300).contains(&reply.status);

    if let Ok(parsed) = serde_json::from_str::<GenerateResponse>(&reply.body) {
        if let Some(message) = parsed.error {
            return Err(RequestError::Server(message));
        }
        if !ok {
            return Err(RequestError::Transport(format!(
                "server answered with HTTP status {}",
                reply.status
            )));
        }
        return Ok(Reply {
            text: parsed.response.unwrap_or_else(|| NO_RESPONSE.to_string()),
            context: parsed.context,
        });
    }

    if !ok {
        return Err(RequestError::Transport(format!(
            "server answered with HTTP status {}",
            reply.status
        )));
    }
    if reply.body.trim().is_empty() {
        return Ok(Reply {
            text: NO_RESPONSE.to_string(),
            context: None,
        });
    }
    Err(RequestError::MalformedResponse { raw: reply.body })
}

/// Full endpoint URL for a configured server address. A bare `host:port`
/// gets an `http://` scheme; an explicit scheme is kept as given.
fn endpoint(host: &str) -> String {
    let base = host.trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{}/api/generate", base)
    } else {
        format!("http://{}/api/generate", base)
    }
}
