use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::ContentDescription;
use crate::types::MediaDirection;

/// Jingle action carried by a negotiation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JingleAction {
    SessionInitiate,
    SessionAccept,
    SessionTerminate,
    SourceAdd,
    SourceRemove,
    TransportInfo,
    /// Any action this crate has no name for
    Other(String),
}

impl fmt::Display for JingleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionInitiate => write!(f, "session-initiate"),
            Self::SessionAccept => write!(f, "session-accept"),
            Self::SessionTerminate => write!(f, "session-terminate"),
            Self::SourceAdd => write!(f, "source-add"),
            Self::SourceRemove => write!(f, "source-remove"),
            Self::TransportInfo => write!(f, "transport-info"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// What an inbound message asks a participant to do.
///
/// This is the closed set the session dispatches on; adding a variant makes
/// every unhandled dispatch site a compile error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundAction {
    Offer,
    AddSource,
    RemoveSource,
    Other(JingleAction),
}

impl From<&JingleAction> for InboundAction {
    fn from(action: &JingleAction) -> Self {
        match action {
            JingleAction::SessionInitiate => Self::Offer,
            JingleAction::SourceAdd => Self::AddSource,
            JingleAction::SourceRemove => Self::RemoveSource,
            other => Self::Other(other.clone()),
        }
    }
}

/// Reason condition of a session-terminate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonCondition {
    /// Normal hang-up
    Gone,
    Success,
    Decline,
    FailedApplication,
    FailedTransport,
    UnsupportedApplications,
}

/// Reason attached to a session-terminate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub condition: ReasonCondition,
    #[serde(default)]
    pub text: Option<String>,
}

/// A Jingle negotiation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JingleMessage {
    /// Stanza identifier, echoed by the acknowledgement
    pub id: String,
    pub from: String,
    pub to: String,
    /// Jingle session identifier
    pub sid: String,
    pub action: JingleAction,
    #[serde(default)]
    pub initiator: Option<String>,
    #[serde(default)]
    pub responder: Option<String>,
    #[serde(default)]
    pub contents: Vec<ContentDescription>,
    #[serde(default)]
    pub reason: Option<Reason>,
}

impl JingleMessage {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        sid: impl Into<String>,
        action: JingleAction,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            sid: sid.into(),
            action,
            initiator: None,
            responder: None,
            contents: Vec::new(),
            reason: None,
        }
    }

    pub fn with_contents(mut self, contents: Vec<ContentDescription>) -> Self {
        self.contents = contents;
        self
    }

    /// Build the session-accept answering `offer`.
    ///
    /// Addressing is mirrored from the offer and the offer's sender is
    /// recorded as the session initiator.
    pub fn session_accept(offer: &JingleMessage, contents: Vec<ContentDescription>) -> Self {
        Self {
            id: format!("accept-{}", uuid::Uuid::new_v4()),
            from: offer.to.clone(),
            to: offer.from.clone(),
            sid: offer.sid.clone(),
            action: JingleAction::SessionAccept,
            initiator: Some(offer.from.clone()),
            responder: Some(offer.to.clone()),
            contents,
            reason: None,
        }
    }

    /// Build the session-terminate closing the session `accept` established
    pub fn session_terminate(
        accept: &JingleMessage,
        condition: ReasonCondition,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("terminate-{}", uuid::Uuid::new_v4()),
            from: accept.from.clone(),
            to: accept.to.clone(),
            sid: accept.sid.clone(),
            action: JingleAction::SessionTerminate,
            initiator: accept.initiator.clone(),
            responder: accept.responder.clone(),
            contents: Vec::new(),
            reason: Some(Reason {
                condition,
                text: Some(text.into()),
            }),
        }
    }

    /// Content with the given media-type label
    pub fn content(&self, name: &str) -> Option<&ContentDescription> {
        self.contents.iter().find(|c| c.name == name)
    }
}

/// Protocol-level "received" acknowledgement of a negotiation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Identifier of the acknowledged message
    pub id: String,
    pub from: String,
    pub to: String,
}

impl Acknowledgement {
    /// Acknowledgement addressed back to the sender of `message`
    pub fn for_message(message: &JingleMessage) -> Self {
        Self {
            id: message.id.clone(),
            from: message.to.clone(),
            to: message.from.clone(),
        }
    }
}

/// A media source announced in presence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaSource {
    pub media_type: String,
    /// Source identifier, in decimal
    pub ssrc: String,
    pub direction: MediaDirection,
}

/// Presence sent to the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    /// Occupant address the presence is sent to
    pub to: String,
    /// Nickname extension, so room members display the right name
    pub nick: String,
    /// Media-source extension; empty means no extension
    #[serde(default)]
    pub sources: Vec<MediaSource>,
}

impl Presence {
    pub fn new(to: impl Into<String>, nick: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            nick: nick.into(),
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<MediaSource>) -> Self {
        self.sources = sources;
        self
    }
}

/// Request asking the focus to set up the conference for a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceRequest {
    /// Address of the focus
    pub to: String,
    /// Room address the conference is requested for
    pub room: String,
    /// Conference properties as (name, value) pairs
    pub properties: Vec<(String, String)>,
}
