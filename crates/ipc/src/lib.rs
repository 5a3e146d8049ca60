//! Typed message bus between the host process and the UI process.
//!
//! Everything the two sides say to each other travels through here: the
//! channel vocabulary is a closed set of enums, serialized into JSON
//! envelopes so that either end treats an unrecognized value as a defect
//! rather than a crash.

mod endpoint;
mod message;

pub use endpoint::{pair, HostEndpoint, UiEndpoint};
pub use message::{
    Channel, Envelope, MenuCommand, MessageId, Reply, RendererEvent, RendererRequest,
    SettingsRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("channel disconnected")]
    Disconnected,
    #[error("a responder is already registered for channel '{0}'")]
    ResponderAlreadyRegistered(Channel),
    #[error("request rejected by peer: {0}")]
    Rejected(String),
    #[error("unsupported message on channel '{channel}': {reason}")]
    UnsupportedMessage { channel: Channel, reason: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
