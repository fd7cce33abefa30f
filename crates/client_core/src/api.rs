//! Typed calls for the endpoints the settings view uses.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{BaseInfo, ServiceInfo},
    error::RequestError,
    protocol::{
        Ack, BaseInfoResponse, ServiceInfoResponse, UpdateBaseRequest, UpdateProgress,
        UpdateProgressResponse,
    },
};
use tracing::debug;

use crate::BaseTransport;

#[derive(Clone)]
pub struct BaseApi {
    transport: Arc<dyn BaseTransport>,
    prefix: String,
}

impl BaseApi {
    pub fn new(transport: Arc<dyn BaseTransport>, api_prefix: &str) -> Self {
        Self {
            transport,
            prefix: api_prefix.trim_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Push-event topic for this base.
    pub fn event_topic(&self) -> String {
        format!("/{}/event", self.prefix)
    }

    fn path(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.prefix)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, RequestError> {
        let value = self.transport.get(&self.path(endpoint)).await?;
        decode(value)
    }

    async fn post_ack(&self, endpoint: &str, body: Option<Value>) -> Result<(), RequestError> {
        debug!(endpoint, "posting base action");
        let value = self.transport.post(&self.path(endpoint), body).await?;
        decode::<Ack>(value)?.into_result()
    }

    pub async fn update_progress(&self) -> Result<UpdateProgress, RequestError> {
        self.get_json::<UpdateProgressResponse>("base-update-progress")
            .await?
            .into_result()
    }

    pub async fn base_info(&self) -> Result<BaseInfo, RequestError> {
        self.get_json::<BaseInfoResponse>("base-info")
            .await?
            .into_result()
    }

    pub async fn service_info(&self) -> Result<ServiceInfo, RequestError> {
        self.get_json::<ServiceInfoResponse>("service-info")
            .await?
            .into_result()
    }

    pub async fn reboot_base(&self) -> Result<(), RequestError> {
        self.post_ack("reboot-base", None).await
    }

    pub async fn shutdown_base(&self) -> Result<(), RequestError> {
        self.post_ack("shutdown-base", None).await
    }

    pub async fn enable_tor(&self, enable: bool) -> Result<(), RequestError> {
        self.post_ack("enable-tor", Some(Value::Bool(enable))).await
    }

    pub async fn update_base(&self, version: &str) -> Result<(), RequestError> {
        let body = serde_json::to_value(UpdateBaseRequest {
            version: version.to_string(),
        })
        .map_err(|err| RequestError::Decode(err.to_string()))?;
        self.post_ack("update-base", Some(body)).await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    serde_json::from_value(value).map_err(|err| RequestError::Decode(err.to_string()))
}
