//! Jingle wire model
//!
//! Protocol-level shapes of the negotiation messages a participant exchanges
//! with the conference: offers and answers (`session-initiate` /
//! `session-accept`), source updates, terminate, acknowledgements and
//! presence. Encoding to and from XML belongs to the signaling channel; this
//! crate only builds and inspects these values.

pub mod message;
pub mod types;

pub use message::{
    Acknowledgement, ConferenceRequest, InboundAction, JingleAction, JingleMessage, MediaSource,
    Presence, Reason, ReasonCondition,
};
pub use types::{
    Candidate, CandidateKind, ContentDescription, Creator, Fingerprint, IceUdpTransport,
    PayloadType, RtpDescription, SctpMap, Senders, SourceDescription,
};
