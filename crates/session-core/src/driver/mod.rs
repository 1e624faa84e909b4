//! Load driver: runs many participant sessions against one room
//!
//! ```text
//! HammerConfig ──┐
//!                ├── Hammer::start ── participant 0 ── JingleSession ── SessionHandle
//! Participant- ──┘         │          participant 1 ── ...
//! Factory                  └─ stagger between launches
//! ```
//!
//! Sessions share nothing: each one gets its own signaling channel,
//! connectivity engine and media stack from the factory.

use async_trait::async_trait;
use futures::future::join_all;
use hammer_infra_common::LogContext;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn, Instrument, Level};

use crate::adapters::{ConnectivityEngine, MediaStack, SignalingChannel};
use crate::config::HammerConfig;
use crate::session::{JingleSession, SessionHandle, SessionState};
use crate::types::ParticipantIdentity;

/// The collaborators one participant runs on
pub struct ParticipantResources {
    pub signaling: Arc<dyn SignalingChannel>,
    pub connectivity: Arc<dyn ConnectivityEngine>,
    pub media: Arc<dyn MediaStack>,
}

/// Builds the collaborators for participant `index`
#[async_trait]
pub trait ParticipantFactory: Send + Sync {
    async fn create(&self, index: usize) -> anyhow::Result<ParticipantResources>;
}

/// Aggregate view over every launched participant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HammerStats {
    pub launched: usize,
    pub active: usize,
    /// Sessions that reported a fatal error
    pub failed: usize,
    pub terminated: usize,
    /// Participants whose collaborators could not be built
    pub factory_failures: usize,
    pub failures_by_kind: BTreeMap<String, usize>,
}

/// Runs a fleet of participant sessions
pub struct Hammer {
    config: HammerConfig,
    factory: Arc<dyn ParticipantFactory>,
    sessions: Vec<SessionHandle>,
    factory_failures: usize,
}

impl Hammer {
    pub fn new(config: HammerConfig, factory: Arc<dyn ParticipantFactory>) -> Self {
        Self {
            config,
            factory,
            sessions: Vec::new(),
            factory_failures: 0,
        }
    }

    pub fn sessions(&self) -> &[SessionHandle] {
        &self.sessions
    }

    /// Launch every configured participant, pausing the stagger interval
    /// between two launches.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.config.validate()?;

        let session_config = self.config.session_config();
        let stagger = self.config.stagger();
        info!(
            "Starting {} participant(s) in {}",
            self.config.participants,
            self.config.host.room_address()
        );

        for index in 0..self.config.participants {
            if index > 0 && !stagger.is_zero() {
                tokio::time::sleep(stagger).await;
            }

            let nickname = self.config.nickname_for(index);
            let context = LogContext::with_operation("hammer", "launch")
                .with_field("participant", index.to_string())
                .with_field("nick", nickname.clone());

            let resources = match self
                .factory
                .create(index)
                .instrument(context.span(Level::INFO))
                .await
            {
                Ok(resources) => resources,
                Err(e) => {
                    warn!("{} could not build participant: {:#}", context, e);
                    self.factory_failures += 1;
                    continue;
                }
            };

            let identity = ParticipantIdentity::new(self.config.host.clone(), nickname);
            let session = JingleSession::new(
                identity,
                session_config.clone(),
                resources.signaling,
                resources.connectivity,
                resources.media,
            );
            info!("{} launching session {}", context, session.id());
            self.sessions.push(session.spawn());
        }

        Ok(())
    }

    /// Stop every session concurrently and wait for all teardowns
    pub async fn stop(&self) {
        info!("Stopping {} session(s)", self.sessions.len());
        join_all(self.sessions.iter().map(|session| session.stop())).await;
    }

    pub fn summary(&self) -> HammerStats {
        let mut stats = HammerStats {
            launched: self.sessions.len(),
            factory_failures: self.factory_failures,
            ..HammerStats::default()
        };

        for session in &self.sessions {
            match session.state() {
                SessionState::Active => stats.active += 1,
                SessionState::Terminated => stats.terminated += 1,
                _ => {}
            }
            if let Some(failure) = session.failure() {
                stats.failed += 1;
                *stats.failures_by_kind.entry(failure.kind().to_string()).or_default() += 1;
            }
        }

        stats
    }
}
