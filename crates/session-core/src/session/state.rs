use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a participant session
///
/// ```text
/// Disconnected → Connecting → JoiningRoom → AwaitingOffer → Negotiating
///     → AwaitingConnectivity → Active → Terminating → Terminated
/// ```
///
/// Any live state may move to `Terminating`; `Connecting` and `Disconnected`
/// go straight to `Terminated` since nothing is held yet. `Terminated` is
/// final: restarting needs a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Disconnected,
    Connecting,
    JoiningRoom,
    AwaitingOffer,
    Negotiating,
    AwaitingConnectivity,
    Active,
    Terminating,
    Terminated,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Whether the session is going away or gone
    pub fn is_ending(&self) -> bool {
        matches!(self, Self::Terminating | Self::Terminated)
    }

    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;

        match (*self, next) {
            (Disconnected, Connecting) => true,
            (Connecting, JoiningRoom) => true,
            (JoiningRoom, AwaitingOffer) => true,
            (AwaitingOffer, Negotiating) => true,
            (Negotiating, AwaitingConnectivity) => true,
            (AwaitingConnectivity, Active) => true,
            (Disconnected | Connecting, Terminated) => true,
            (Terminating, Terminated) => true,
            (Terminating | Terminated, _) => false,
            (_, Terminating) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::JoiningRoom => "joining-room",
            Self::AwaitingOffer => "awaiting-offer",
            Self::Negotiating => "negotiating",
            Self::AwaitingConnectivity => "awaiting-connectivity",
            Self::Active => "active",
            Self::Terminating => "terminating",
            Self::Terminated => "terminated",
        };
        write!(f, "{}", name)
    }
}
