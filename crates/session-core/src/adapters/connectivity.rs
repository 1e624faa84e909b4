use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

/// Candidate type in the connectivity engine's representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateType {
    Host,
    ServerReflexive,
    PeerReflexive,
    Relay,
}

/// Transport protocol of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    Udp,
    Tcp,
}

/// ICE candidate as the connectivity engine sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub foundation: String,
    /// Component ID (1 = RTP, 2 = RTCP)
    pub component: u8,
    pub transport: TransportProtocol,
    pub priority: u32,
    pub address: SocketAddr,
    pub candidate_type: CandidateType,
    /// Base or related address for reflexive and relay candidates
    pub related_address: Option<SocketAddr>,
    pub generation: u32,
}

/// Remote ICE credentials and candidates for one media type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteCandidates {
    pub ufrag: Option<String>,
    pub pwd: Option<String>,
    pub candidates: Vec<IceCandidate>,
}

/// Local ICE credentials and gathered candidates for one media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCandidates {
    pub ufrag: String,
    pub pwd: String,
    pub candidates: Vec<IceCandidate>,
}

/// Gathering result, keyed by media-type label
pub type GatheredCandidates = HashMap<String, LocalCandidates>;

/// State of a connectivity session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    New,
    Gathering,
    Checking,
    /// Connected and usable; terminal
    Connected,
    /// No working pair was found; terminal
    Failed,
    /// Closed before completing; terminal
    Closed,
}

impl ConnectivityState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Connected | Self::Failed | Self::Closed)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Gathering => write!(f, "gathering"),
            Self::Checking => write!(f, "checking"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Transport path selected for a media type once connectivity is established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstablishedTransport {
    pub local: SocketAddr,
    pub remote: SocketAddr,
}

/// Callback fired once with the terminal connectivity state
pub type TerminalListener = Box<dyn FnOnce(ConnectivityState) + Send>;

/// Errors reported by the connectivity engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectivityError {
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("unknown media type '{0}'")]
    UnknownMediaType(String),

    #[error("gathering failed: {0}")]
    Gathering(String),

    #[error("connectivity checks failed to start: {0}")]
    Checks(String),
}

/// Factory for per-participant connectivity sessions
#[async_trait]
pub trait ConnectivityEngine: Send + Sync {
    /// Allocate a session with one ICE stream per media-type label
    async fn create(
        &self,
        media_types: &[String],
    ) -> Result<Box<dyn ConnectivitySession>, ConnectivityError>;
}

/// One participant's ICE agent. Owned exclusively by its session.
#[async_trait]
pub trait ConnectivitySession: Send + Sync {
    /// Labels the session was created for
    fn media_types(&self) -> Vec<String>;

    async fn add_remote_candidates(
        &self,
        media_type: &str,
        remote: RemoteCandidates,
    ) -> Result<(), ConnectivityError>;

    /// Gather local candidates for every media type
    async fn gather_candidates(&self) -> Result<GatheredCandidates, ConnectivityError>;

    async fn start_connectivity_establishment(&self) -> Result<(), ConnectivityError>;

    /// Register the terminal-state callback.
    ///
    /// If the session is already terminal the callback fires immediately.
    fn on_terminal(&self, listener: TerminalListener);

    /// Selected transport for a media type; `None` until connected
    fn selected_transport(&self, media_type: &str) -> Option<EstablishedTransport>;

    async fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(ConnectivityState::Connected.is_terminal());
        assert!(ConnectivityState::Failed.is_terminal());
        assert!(ConnectivityState::Closed.is_terminal());
        assert!(!ConnectivityState::Checking.is_terminal());
        assert!(!ConnectivityState::Failed.is_connected());
    }
}
