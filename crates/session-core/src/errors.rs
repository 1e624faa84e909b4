//! Error types for participant sessions

use thiserror::Error;

use crate::adapters::SignalingError;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors a participant session can report to its driver.
///
/// Everything except [`SessionError::NicknameConflict`] is fatal for the
/// session that raised it. Nothing is retried automatically apart from the
/// nickname-conflict loop during room join.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// Transport or anonymous authentication failure on initial connect
    #[error("Signaling connection failed: {reason}")]
    SignalingConnectFailure { reason: String },

    /// The room rejected the nickname as already taken
    #[error("Nickname '{nickname}' is already taken in the room")]
    NicknameConflict { nickname: String },

    /// Every allowed join attempt hit a nickname conflict
    #[error("No free nickname found after {attempts} join attempts")]
    NicknameRetriesExhausted { attempts: u32 },

    /// The room refused the join for a reason other than a nickname conflict
    #[error("Room join failed: {reason}")]
    RoomJoinFailure { reason: String },

    /// An offered media type carries no format the local media stack supports
    #[error("No supported format offered for media type '{media_type}'")]
    UnsupportedMediaFormat { media_type: String },

    /// The connectivity engine could not allocate a session
    #[error("Connectivity allocation failed: {reason}")]
    ConnectivityAllocationFailure { reason: String },

    /// Remote candidate registration or local candidate gathering failed
    #[error("Candidate exchange failed: {reason}")]
    CandidateGatheringFailure { reason: String },

    /// The connectivity engine reached a terminal state other than connected
    #[error("Connectivity establishment failed in state '{state}'")]
    ConnectivityEstablishmentFailure { state: String },

    /// A media stream could not be created, bound, encrypted or started
    #[error("Media activation failed for '{media_type}': {reason}")]
    MediaActivationFailure { media_type: String, reason: String },

    /// A signaling send failed after the channel was connected
    #[error("Signaling error: {0}")]
    Signaling(#[from] SignalingError),

    /// An operation was attempted in a state that does not allow it
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Invalid session configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl SessionError {
    /// Create an unsupported media format error
    pub fn unsupported_format(media_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaFormat {
            media_type: media_type.into(),
        }
    }

    /// Create a media activation error
    pub fn media_activation(media_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MediaActivationFailure {
            media_type: media_type.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Short stable label used when aggregating failures across sessions
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignalingConnectFailure { .. } => "signaling_connect",
            Self::NicknameConflict { .. } => "nickname_conflict",
            Self::NicknameRetriesExhausted { .. } => "nickname_retries_exhausted",
            Self::RoomJoinFailure { .. } => "room_join",
            Self::UnsupportedMediaFormat { .. } => "unsupported_media_format",
            Self::ConnectivityAllocationFailure { .. } => "connectivity_allocation",
            Self::CandidateGatheringFailure { .. } => "candidate_gathering",
            Self::ConnectivityEstablishmentFailure { .. } => "connectivity_establishment",
            Self::MediaActivationFailure { .. } => "media_activation",
            Self::Signaling(_) => "signaling",
            Self::InvalidState { .. } => "invalid_state",
            Self::Configuration { .. } => "configuration",
        }
    }

    /// Whether the session recovers from this error on its own
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NicknameConflict { .. })
    }
}
