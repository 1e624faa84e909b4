//! Observation and control of a running participant session

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::state::SessionState;
use crate::errors::{SessionError, SessionResult};
use crate::types::SessionId;

/// Snapshot published by a session on every state change or failure
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub state: SessionState,
    /// First fatal error the session reported, if any
    pub failure: Option<SessionError>,
}

impl SessionStatus {
    pub(crate) fn initial() -> Self {
        Self {
            state: SessionState::Disconnected,
            failure: None,
        }
    }
}

/// State shared between a session's control task and its handles
#[derive(Debug)]
pub(crate) struct SessionShared {
    pub(crate) id: SessionId,
    pub(crate) status: watch::Receiver<SessionStatus>,
    pub(crate) nickname: RwLock<String>,
    pub(crate) cancel: CancellationToken,
}

/// Handle to a spawned participant session.
///
/// Cloning is cheap; every clone controls the same session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionHandle {
    pub(crate) fn new(shared: Arc<SessionShared>, task: JoinHandle<()>) -> Self {
        Self {
            shared,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.shared.id
    }

    pub fn state(&self) -> SessionState {
        self.shared.status.borrow().state
    }

    /// Fatal error reported by the session, if any
    pub fn failure(&self) -> Option<SessionError> {
        self.shared.status.borrow().failure.clone()
    }

    /// Current nickname; final once the room join succeeded
    pub fn nickname(&self) -> String {
        self.shared.nickname.read().clone()
    }

    /// Receiver notified on every status change
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.shared.status.clone()
    }

    /// Wait until the session reaches `target`.
    ///
    /// Returns the session's failure if one is reported first, or an
    /// invalid-state error if the session ends without reaching `target`.
    pub async fn wait_for(&self, target: SessionState) -> SessionResult<()> {
        let mut status = self.subscribe();
        let reached = status
            .wait_for(|s| {
                s.state == target
                    || s.state.is_terminal()
                    || (!target.is_ending() && s.failure.is_some())
            })
            .await
            .map(|s| SessionStatus::clone(&s));

        match reached {
            Ok(s) if s.state == target => Ok(()),
            Ok(s) => Err(s.failure.unwrap_or_else(|| {
                SessionError::invalid_state(format!(
                    "session ended in {} before reaching {}",
                    s.state, target
                ))
            })),
            Err(_) => Err(SessionError::invalid_state(format!(
                "session task exited before reaching {}",
                target
            ))),
        }
    }

    /// Stop the session and wait for its teardown to finish.
    ///
    /// Safe to call any number of times, from any clone.
    pub async fn stop(&self) {
        debug!("Stop requested for {}", self.shared.id);
        self.shared.cancel.cancel();

        let mut status = self.subscribe();
        // A closed channel means the control task is gone, which is as
        // final as Terminated.
        let _ = status.wait_for(|s| s.state.is_terminal()).await;
    }

    /// Wait for the control task to exit.
    ///
    /// Returns the session's failure, if it reported one. Only the first
    /// caller actually awaits the task.
    pub async fn join(&self) -> SessionResult<()> {
        let task = self.task.lock().take();
        if let Some(task) = task {
            task.await
                .map_err(|e| SessionError::invalid_state(format!("session task aborted: {}", e)))?;
        }

        match self.failure() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}
