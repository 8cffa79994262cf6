use super::message::PushwooshMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Placeholder Pushwoosh returns instead of a message code when a batch
/// reaches fewer than 10 unique devices
pub(super) const CODE_NOT_AVAILABLE: &str = "CODE_NOT_AVAILABLE";

#[derive(Debug, Serialize)]
pub(super) struct CreateMessageRequest<'a> {
    pub request: CreateMessageBody<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateMessageBody<'a> {
    pub application: &'a str,
    pub auth: &'a str,
    pub notifications: &'a [PushwooshMessage],
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateMessageResponse {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub status_message: Option<String>,
    // Left untyped: on errors the API sends `null` or an empty array here
    #[serde(default)]
    pub response: Option<Value>,
}

impl CreateMessageResponse {
    pub fn result(&self) -> Result<CreateMessageResult, serde_json::Error> {
        match &self.response {
            Some(value @ Value::Object(_)) => CreateMessageResult::deserialize(value),
            _ => Ok(CreateMessageResult::default()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct CreateMessageResult {
    #[serde(rename = "Messages", default)]
    pub messages: Option<Vec<String>>,
    #[serde(rename = "UnknownDevices", default)]
    pub unknown_devices: Option<UnknownDevices>,
}

/// Unknown devices as a flat list or grouped by message code
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum UnknownDevices {
    List(Vec<String>),
    ByCode(BTreeMap<String, Vec<String>>),
}

impl UnknownDevices {
    pub fn into_devices(self) -> Vec<String> {
        match self {
            UnknownDevices::List(devices) => devices,
            UnknownDevices::ByCode(grouped) => grouped.into_values().flatten().collect(),
        }
    }
}
