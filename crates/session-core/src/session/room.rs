//! Room membership: join with nickname retry, announce, leave

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::{JoinError, SignalingChannel};
use crate::config::HostInfo;
use crate::errors::{SessionError, SessionResult};
use crate::jingle::{MediaSource, Presence};

/// Result of a successful room join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    /// Nickname the room accepted
    pub nickname: String,
    /// Join requests sent, the successful one included
    pub attempts: u32,
}

/// A participant's membership of the shared room
pub struct RoomMembership {
    signaling: Arc<dyn SignalingChannel>,
    host: HostInfo,
    nickname: Option<String>,
}

impl RoomMembership {
    pub fn new(signaling: Arc<dyn SignalingChannel>, host: HostInfo) -> Self {
        Self {
            signaling,
            host,
            nickname: None,
        }
    }

    /// Nickname held in the room, once joined
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub fn is_joined(&self) -> bool {
        self.nickname.is_some()
    }

    /// Join the room, appending `marker` to the nickname on every conflict.
    ///
    /// At most `max_attempts` join requests are sent.
    pub async fn join(
        &mut self,
        nickname: &str,
        marker: char,
        max_attempts: u32,
    ) -> SessionResult<JoinedRoom> {
        let room = self.host.room_address();
        let mut candidate = nickname.to_string();
        let mut attempts = 0;

        while attempts < max_attempts {
            attempts += 1;
            debug!("Joining {} as '{}' (attempt {})", room, candidate, attempts);

            match self.signaling.join_room(&room, &candidate).await {
                Ok(()) => {
                    info!("Joined {} as '{}' after {} attempt(s)", room, candidate, attempts);
                    self.nickname = Some(candidate.clone());
                    return Ok(JoinedRoom {
                        nickname: candidate,
                        attempts,
                    });
                }
                Err(JoinError::NicknameConflict) => {
                    let conflict = SessionError::NicknameConflict {
                        nickname: candidate.clone(),
                    };
                    debug!("{}", conflict);
                    candidate.push(marker);
                }
                Err(JoinError::Fatal(reason)) => {
                    return Err(SessionError::RoomJoinFailure { reason });
                }
            }
        }

        Err(SessionError::NicknameRetriesExhausted { attempts })
    }

    /// Send the welcome chat message, if any, then the identity presence
    pub async fn announce(&self, welcome: Option<&str>) -> SessionResult<()> {
        let nickname = self
            .nickname
            .as_deref()
            .ok_or_else(|| SessionError::invalid_state("cannot announce before joining the room"))?;

        if let Some(body) = welcome {
            // Cosmetic only.
            if let Err(e) = self.signaling.send_group_message(body).await {
                warn!("Failed to send welcome message: {}", e);
            }
        }

        let presence = Presence::new(self.host.occupant_address(nickname), nickname);
        self.signaling.send_presence(presence).await?;
        Ok(())
    }

    /// Re-send presence with the local media sources attached
    pub async fn announce_sources(&self, sources: Vec<MediaSource>) -> SessionResult<()> {
        let nickname = self
            .nickname
            .as_deref()
            .ok_or_else(|| {
                SessionError::invalid_state("cannot announce sources before joining the room")
            })?;

        let presence =
            Presence::new(self.host.occupant_address(nickname), nickname).with_sources(sources);
        self.signaling.send_presence(presence).await?;
        Ok(())
    }

    /// Leave the room. Best-effort: failures are logged and forgotten.
    pub async fn leave(&mut self) {
        if self.nickname.take().is_none() {
            return;
        }
        if let Err(e) = self.signaling.leave_room().await {
            warn!("Leaving {} failed: {}", self.host.room_address(), e);
        }
    }
}
