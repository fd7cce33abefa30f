//! reqwest and WebSocket adapters for the base API.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use shared::{error::RequestError, protocol::BaseEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use crate::{BaseTransport, EventSource, Subscription};

const EVENT_BUFFER: usize = 64;

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RequestError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RequestError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| RequestError::Transport(format!("invalid request path {path}: {err}")))
    }
}

#[async_trait]
impl BaseTransport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value, RequestError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        send_json(self.http.get(url)).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, RequestError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let request = match body {
            Some(body) => self.http.post(url).json(&body),
            None => self.http.post(url),
        };
        send_json(request).await
    }
}

async fn send_json(request: RequestBuilder) -> Result<Value, RequestError> {
    let response = request.send().await.map_err(|err| {
        if err.is_timeout() {
            RequestError::Transport(format!("request timed out: {err}"))
        } else {
            RequestError::Transport(err.to_string())
        }
    })?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RequestError::Status {
            status: status.as_u16(),
            message: body.trim().to_string(),
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|err| RequestError::Decode(err.to_string()))
}

pub struct WsEventSource {
    ws_base: Url,
}

impl WsEventSource {
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        Ok(Self {
            ws_base: websocket_base(base_url)?,
        })
    }
}

#[async_trait]
impl EventSource for WsEventSource {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, RequestError> {
        let ws_url = self
            .ws_base
            .join(topic.trim_start_matches('/'))
            .map_err(|err| RequestError::Transport(format!("invalid event topic {topic}: {err}")))?;
        let (ws_stream, _) = connect_async(ws_url.as_str()).await.map_err(|err| {
            RequestError::Transport(format!("failed to connect websocket {ws_url}: {err}"))
        })?;
        let (_, mut ws_reader) = ws_stream.split();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let topic = topic.to_string();
        let reader = tokio::spawn(async move {
            while let Some(msg) = ws_reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<BaseEvent>(&text) {
                        Ok(event) => {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!(%topic, %err, "invalid base event"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!(%topic, %err, "websocket receive failed");
                        break;
                    }
                }
            }
            debug!(%topic, "event stream closed");
        });

        Ok(Subscription::new(rx, move || reader.abort()))
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, RequestError> {
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized)
        .map_err(|err| RequestError::Transport(format!("invalid base url {base_url}: {err}")))
}

/// Maps an `http(s)://` base URL onto its `ws(s)://` counterpart.
pub fn websocket_base(base_url: &str) -> Result<Url, RequestError> {
    let mut url = parse_base_url(base_url)?;
    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(RequestError::Transport(format!(
                "base url must start with http:// or https://, got {other}://"
            )))
        }
    };
    url.set_scheme(scheme).map_err(|_| {
        RequestError::Transport(format!("cannot derive websocket url from {base_url}"))
    })?;
    Ok(url)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
