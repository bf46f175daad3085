use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{InitPayload, UpdatePayload};

pub const INIT_WIDGET: &str = "INIT_WIDGET";
pub const UPDATE_TABLE: &str = "UPDATE_TABLE";
pub const PLAYER_CLICK: &str = "PLAYER_CLICK";

#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    Init(InitPayload),
    Update(UpdatePayload),
}

/// Why an inbound message was dropped. Dropping is never an error for the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    MissingType,
    UnknownType(String),
    MalformedUpdate,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingType => write!(f, "message without a type"),
            DropReason::UnknownType(kind) => write!(f, "unrecognized message type {kind:?}"),
            DropReason::MalformedUpdate => {
                write!(f, "{UPDATE_TABLE} without a team id or a players list")
            }
        }
    }
}

impl HostMessage {
    pub fn decode(data: &Value) -> Result<HostMessage, DropReason> {
        let kind = match data.get("type") {
            Some(Value::String(kind)) if !kind.is_empty() => kind.as_str(),
            Some(Value::Null) | None => return Err(DropReason::MissingType),
            Some(Value::String(_)) => return Err(DropReason::MissingType),
            Some(other) => return Err(DropReason::UnknownType(other.to_string())),
        };
        let payload = data.get("payload").unwrap_or(&Value::Null);
        match kind {
            INIT_WIDGET => Ok(HostMessage::Init(InitPayload::from_value(payload))),
            UPDATE_TABLE => UpdatePayload::from_value(payload)
                .map(HostMessage::Update)
                .ok_or(DropReason::MalformedUpdate),
            other => Err(DropReason::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerClick {
    pub team_id: String,
    pub player_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage {
    #[serde(rename = "PLAYER_CLICK")]
    PlayerClick(PlayerClick),
}

impl OutboundMessage {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

pub fn envelope(kind: &str, payload: Value) -> Value {
    serde_json::json!({ "type": kind, "payload": payload })
}
