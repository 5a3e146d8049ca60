//! Wire format: channels, typed payloads, and the JSON envelope.

use doc_model::{AppInfo, MenuItemState};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a message; replies reference the request's id
/// through the envelope's correlation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The string-keyed multiplexer the two processes share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    AppInfo,
    MenuCommand,
    RendererRequest,
    RendererEvent,
    Settings,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::AppInfo => "app-info",
            Channel::MenuCommand => "menu-command",
            Channel::RendererRequest => "renderer-request",
            Channel::RendererEvent => "renderer-event",
            Channel::Settings => "settings",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host → UI, fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum MenuCommand {
    OpenMarkdown { filepath: String, contents: String },
    SaveAsPdf,
    SetStylesheet { value: String },
}

/// UI → host, fire-and-forget. At-most-once; failures are logged, never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RendererEvent {
    ModalOpened,
    ModalClosed,
    SaveAsPdf { filepath: String, html: String, header: String, footer: String },
    TabChanged { menu_states: Vec<MenuItemState> },
}

/// UI → host, exactly one reply per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "kebab-case")]
pub enum RendererRequest {
    GetAvailableStylesheets,
    GetStylesheet { filepath: String },
}

/// UI → host on the settings channel, exactly one reply per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "kebab-case")]
pub enum SettingsRequest {
    GetSettings,
}

/// Reply payload for request/response channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "kebab-case")]
pub enum Reply {
    Ok(serde_json::Value),
    Err(String),
}

/// One message on the wire. The payload is kept as JSON so a defective
/// value surfaces as a decode error at the receiving end instead of
/// poisoning the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub id: MessageId,
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<MessageId>,
    pub payload: serde_json::Value,
}

impl Envelope {
    pub fn new<T: Serialize>(channel: Channel, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: MessageId::new(),
            channel,
            correlation: None,
            payload: serde_json::to_value(payload)?,
        })
    }

    pub fn reply(request: &Envelope, reply: &Reply) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: MessageId::new(),
            channel: request.channel,
            correlation: Some(request.id),
            payload: serde_json::to_value(reply)?,
        })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

pub(crate) fn app_info_envelope(info: &AppInfo) -> Result<Envelope, serde_json::Error> {
    Envelope::new(Channel::AppInfo, info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_command_round_trips_through_an_envelope() {
        let command = MenuCommand::OpenMarkdown {
            filepath: "/notes/plan.md".to_owned(),
            contents: "# Plan".to_owned(),
        };

        let envelope =
            Envelope::new(Channel::MenuCommand, &command).expect("encode should succeed");
        let decoded: MenuCommand = envelope.decode().expect("decode should succeed");

        assert_eq!(decoded, command);
    }

    #[test]
    fn unknown_command_value_fails_to_decode() {
        let envelope = Envelope {
            id: MessageId::new(),
            channel: Channel::MenuCommand,
            correlation: None,
            payload: serde_json::json!({ "command": "reticulate-splines" }),
        };

        assert!(envelope.decode::<MenuCommand>().is_err());
    }

    #[test]
    fn reply_envelopes_carry_the_request_correlation() {
        let request = Envelope::new(Channel::RendererRequest, &RendererRequest::GetAvailableStylesheets)
            .expect("encode should succeed");
        let reply = Envelope::reply(&request, &Reply::Ok(serde_json::json!(["(default)"])))
            .expect("encode should succeed");

        assert_eq!(reply.correlation, Some(request.id));
        assert_eq!(reply.channel, Channel::RendererRequest);
    }

    #[test]
    fn channel_keys_are_stable_strings() {
        assert_eq!(Channel::RendererEvent.as_str(), "renderer-event");
        assert_eq!(
            serde_json::to_string(&Channel::MenuCommand).expect("serialize should succeed"),
            "\"menu-command\""
        );
    }
}
