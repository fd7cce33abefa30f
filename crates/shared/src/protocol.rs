use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::{BaseInfo, ServiceInfo},
    error::RequestError,
};

/// Event tag announcing that the base's update progress moved.
pub const UPDATE_PROGRESS_CHANGED: &str = "baseUpdateProgressChanged";

/// Phase of a base update. Only the backend advances it.
///
/// The wire form is an integer; the mapping below is the whole contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum UpdateState {
    #[default]
    NotInProgress,
    Downloading,
    Failed,
    Applying,
    Rebooting,
}

impl TryFrom<u8> for UpdateState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::NotInProgress),
            2 => Ok(Self::Downloading),
            3 => Ok(Self::Failed),
            4 => Ok(Self::Applying),
            5 => Ok(Self::Rebooting),
            other => Err(format!("unknown update state {other}")),
        }
    }
}

impl From<UpdateState> for u8 {
    fn from(value: UpdateState) -> Self {
        match value {
            UpdateState::NotInProgress => 1,
            UpdateState::Downloading => 2,
            UpdateState::Failed => 3,
            UpdateState::Applying => 4,
            UpdateState::Rebooting => 5,
        }
    }
}

/// Snapshot of update progress; each fetch replaces the previous one whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateProgress {
    #[serde(rename = "updateState")]
    pub state: UpdateState,
    #[serde(rename = "updatePercentage", deserialize_with = "clamped_percentage")]
    pub percentage: u8,
    #[serde(rename = "updateKBDownloaded")]
    pub kb_downloaded: u64,
}

fn clamped_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.clamp(0.0, 100.0) as u8)
}

/// Tagged push event delivered on a base's event topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEvent {
    pub object: String,
}

impl BaseEvent {
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
        }
    }

    pub fn is_update_progress_changed(&self) -> bool {
        self.object == UPDATE_PROGRESS_CHANGED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBaseRequest {
    pub version: String,
}

/// Plain `{success, message}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    pub fn into_result(self) -> Result<(), RequestError> {
        if self.success {
            Ok(())
        } else {
            Err(RequestError::rejected(self.message))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_progress: Option<UpdateProgress>,
}

impl UpdateProgressResponse {
    pub fn into_result(self) -> Result<UpdateProgress, RequestError> {
        if !self.success {
            return Err(RequestError::rejected(self.message));
        }
        self.update_progress
            .ok_or_else(|| RequestError::Decode("success without updateProgress".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseInfoResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_info: Option<BaseInfo>,
}

impl BaseInfoResponse {
    pub fn into_result(self) -> Result<BaseInfo, RequestError> {
        if !self.success {
            return Err(RequestError::rejected(self.message));
        }
        self.base_info
            .ok_or_else(|| RequestError::Decode("success without baseInfo".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfoResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_info: Option<ServiceInfo>,
}

impl ServiceInfoResponse {
    pub fn into_result(self) -> Result<ServiceInfo, RequestError> {
        if !self.success {
            return Err(RequestError::rejected(self.message));
        }
        self.service_info
            .ok_or_else(|| RequestError::Decode("success without serviceInfo".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_state_uses_one_based_wire_codes() {
        let progress: UpdateProgress = serde_json::from_str(
            r#"{"updateState":2,"updatePercentage":40,"updateKBDownloaded":12000}"#,
        )
        .expect("decode");
        assert_eq!(progress.state, UpdateState::Downloading);
        assert_eq!(progress.percentage, 40);
        assert_eq!(progress.kb_downloaded, 12000);

        let encoded = serde_json::to_value(UpdateState::Rebooting).expect("encode");
        assert_eq!(encoded, serde_json::json!(5));
    }

    #[test]
    fn unknown_update_state_is_rejected() {
        let err = serde_json::from_str::<UpdateProgress>(
            r#"{"updateState":0,"updatePercentage":0,"updateKBDownloaded":0}"#,
        )
        .expect_err("state 0 is not defined");
        assert!(err.to_string().contains("unknown update state"));
    }

    #[test]
    fn percentage_is_clamped_to_hundred() {
        let progress: UpdateProgress = serde_json::from_str(
            r#"{"updateState":4,"updatePercentage":130.5,"updateKBDownloaded":1}"#,
        )
        .expect("decode");
        assert_eq!(progress.percentage, 100);
    }

    #[test]
    fn failed_envelope_keeps_backend_message() {
        let response: UpdateProgressResponse =
            serde_json::from_str(r#"{"success":false,"message":"update server offline"}"#)
                .expect("decode");
        let err = response.into_result().expect_err("rejected");
        assert!(err.is_rejection());
        assert_eq!(err.user_message(), "update server offline");
    }

    #[test]
    fn successful_envelope_without_payload_is_a_decode_error() {
        let response: UpdateProgressResponse =
            serde_json::from_str(r#"{"success":true}"#).expect("decode");
        assert!(matches!(
            response.into_result(),
            Err(RequestError::Decode(_))
        ));
    }

    #[test]
    fn base_info_uses_backend_field_names() {
        let info: BaseInfo = serde_json::from_value(serde_json::json!({
            "hostname": "bitbox-base",
            "middlewareLocalIP": "192.168.1.20",
            "middlewarePort": "8845",
            "middlewareTorOnion": "abcdef.onion",
            "isTorEnabled": true,
            "isBitcoindListening": false,
            "isSSHPasswordLoginEnabled": true,
            "bitcoindVersion": "0.19.0",
            "lightningdVersion": "0.8.0",
            "electrsVersion": "0.8.2",
            "baseVersion": "0.0.4"
        }))
        .expect("decode");
        assert_eq!(info.middleware_local_ip, "192.168.1.20");
        assert!(info.is_ssh_password_login_enabled);
        assert!(!info.is_bitcoind_listening);
    }
}
