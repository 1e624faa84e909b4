use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::jingle::{Acknowledgement, ConferenceRequest, JingleMessage, Presence};

/// Callback receiving every inbound Jingle message
pub type MessageListener = Arc<dyn Fn(JingleMessage) + Send + Sync>;

/// Errors reported by a signaling channel
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalingError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("channel is not connected")]
    NotConnected,

    #[error("send failed: {0}")]
    Send(String),

    #[error("channel closed")]
    Closed,
}

/// Outcome of a failed room join
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JoinError {
    /// The nickname is already taken in the room
    #[error("nickname conflict")]
    NicknameConflict,

    /// Any other refusal
    #[error("join refused: {0}")]
    Fatal(String),
}

/// Structured-message channel to the signaling server.
///
/// The channel is owned by the driver; a session only uses it and invokes
/// [`disconnect`](SignalingChannel::disconnect) during teardown.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    /// Connect and authenticate anonymously
    async fn connect(&self) -> Result<(), SignalingError>;

    /// Ask the conference focus to allocate the room
    async fn request_conference(&self, request: ConferenceRequest) -> Result<(), SignalingError>;

    /// Join `room` under `nickname`
    async fn join_room(&self, room: &str, nickname: &str) -> Result<(), JoinError>;

    /// Leave the room joined last
    async fn leave_room(&self) -> Result<(), SignalingError>;

    /// Send a chat message to the joined room
    async fn send_group_message(&self, body: &str) -> Result<(), SignalingError>;

    async fn send_presence(&self, presence: Presence) -> Result<(), SignalingError>;

    async fn send_message(&self, message: JingleMessage) -> Result<(), SignalingError>;

    async fn send_ack(&self, ack: Acknowledgement) -> Result<(), SignalingError>;

    /// Register the callback for inbound Jingle messages.
    ///
    /// The callback may be invoked from any task and must not block.
    fn on_message(&self, listener: MessageListener);

    async fn disconnect(&self) -> Result<(), SignalingError>;
}
