//! Seams to the external collaborators of a participant session
//!
//! - [`SignalingChannel`]: XMPP connection, room membership and Jingle delivery
//! - [`ConnectivityEngine`]: ICE agent allocation, candidates and checks
//! - [`MediaStack`]: stream creation, transport binding and encryption
//!
//! A session only ever talks to these traits, so a load run can plug in real
//! network stacks while tests plug in in-memory doubles.

pub mod connectivity;
pub mod media;
pub mod signaling;

pub use connectivity::{
    CandidateType, ConnectivityEngine, ConnectivityError, ConnectivitySession, ConnectivityState,
    EstablishedTransport, GatheredCandidates, IceCandidate, LocalCandidates, RemoteCandidates,
    TerminalListener, TransportProtocol,
};
pub use media::{MediaError, MediaStack, MediaStream};
pub use signaling::{JoinError, MessageListener, SignalingChannel, SignalingError};
