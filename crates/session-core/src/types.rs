//! Core identifiers and value types shared across the crate

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::HostInfo;

/// Label of the data-channel media type.
///
/// Contents with this name get a placeholder description during negotiation
/// and never reach the answer.
pub const DATA_MEDIA_TYPE: &str = "data";

/// Whether a content label names the data-channel media type
pub fn is_data_media(label: &str) -> bool {
    label.eq_ignore_ascii_case(DATA_MEDIA_TYPE)
}

/// Identifier of one participant session
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("participant-{}", Uuid::new_v4()))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media direction announced for a source
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl fmt::Display for MediaDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendRecv => write!(f, "sendrecv"),
            Self::SendOnly => write!(f, "sendonly"),
            Self::RecvOnly => write!(f, "recvonly"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Who a participant is on the signaling network.
///
/// The nickname may gain uniqueness markers while joining the room and is
/// fixed once the join succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantIdentity {
    pub host: HostInfo,
    pub nickname: String,
}

impl ParticipantIdentity {
    pub fn new(host: HostInfo, nickname: impl Into<String>) -> Self {
        Self {
            host,
            nickname: nickname.into(),
        }
    }

    /// Bare address of the shared room
    pub fn room_address(&self) -> String {
        self.host.room_address()
    }

    /// Occupant address of this participant inside the room
    pub fn occupant_address(&self) -> String {
        self.host.occupant_address(&self.nickname)
    }
}
