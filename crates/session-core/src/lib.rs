//! Per-participant Jingle session core for a conference load generator.
//!
//! Each emulated participant joins a multi-user chat room, waits for the
//! conference focus to offer a Jingle session, answers it with formats and
//! candidates of its own, waits for ICE connectivity and then starts
//! encrypted media streams. The network stacks behind all of this are
//! plugged in through the traits in [`adapters`].

// Error handling
pub mod errors;

// Identifiers and shared value types
pub mod types;

// Configuration
pub mod config;

// Jingle wire model
pub mod jingle;

// Collaborator seams
pub mod adapters;

// Offer/answer negotiation
pub mod negotiation;

// Session lifecycle
pub mod session;

// Load driver
pub mod driver;

// Public exports
pub use adapters::{
    ConnectivityEngine, ConnectivitySession, ConnectivityState, MediaStack, MediaStream,
    SignalingChannel,
};
pub use config::{ConferenceInfo, HammerConfig, HostInfo, SessionConfig};
pub use driver::{Hammer, HammerStats, ParticipantFactory, ParticipantResources};
pub use errors::{SessionError, SessionResult};
pub use negotiation::PayloadTypeRegistry;
pub use session::{JingleSession, SessionHandle, SessionState, SessionStatus, SsrcGenerator};
pub use types::{MediaDirection, ParticipantIdentity, SessionId};

/// Re-export of common types and functions
pub mod prelude {
    pub use super::{
        ConferenceInfo, ConnectivityEngine, ConnectivitySession, ConnectivityState, Hammer,
        HammerConfig, HammerStats, HostInfo, JingleSession, MediaStack, MediaStream,
        ParticipantFactory, ParticipantIdentity, ParticipantResources, SessionConfig, SessionError,
        SessionHandle, SessionResult, SessionState, SignalingChannel,
    };
}
