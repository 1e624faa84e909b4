//! Participant session lifecycle
//!
//! [`JingleSession`] is configured by the driver and spawned into a single
//! control task. That task walks the session through
//!
//! ```text
//! connect → (conference request) → join room → announce
//!     → wait for offer → negotiate + answer → wait for connectivity
//!     → activate media → ... → teardown
//! ```
//!
//! Inbound Jingle messages and the connectivity engine's terminal
//! notification reach the task as events on one queue, so a session never
//! runs two transitions at once. Stopping cancels the task's token; teardown
//! runs exactly once, inside the task.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, field, info, info_span, warn, Instrument, Span};

use super::ack::acknowledge;
use super::events::{EventSender, SessionEvent};
use super::handle::{SessionHandle, SessionShared, SessionStatus};
use super::room::RoomMembership;
use super::state::SessionState;
use super::streams::{MediaStreamHandle, SsrcGenerator};
use crate::adapters::{
    ConnectivityEngine, ConnectivitySession, ConnectivityState, MediaStack, SignalingChannel,
};
use crate::config::SessionConfig;
use crate::errors::{SessionError, SessionResult};
use crate::jingle::{
    ConferenceRequest, ContentDescription, Fingerprint, InboundAction, JingleMessage, MediaSource,
    ReasonCondition, SourceDescription,
};
use crate::negotiation::dtls::{apply_local_fingerprint, remote_fingerprints};
use crate::negotiation::{
    attach_remote_candidates, harvest_local_candidates, negotiate_offer, PayloadTypeRegistry,
};
use crate::types::{MediaDirection, ParticipantIdentity, SessionId};

/// Whether the control loop keeps running after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// A participant session, ready to be spawned
pub struct JingleSession {
    id: SessionId,
    identity: ParticipantIdentity,
    config: SessionConfig,
    signaling: Arc<dyn SignalingChannel>,
    engine: Arc<dyn ConnectivityEngine>,
    media: Arc<dyn MediaStack>,
    ssrc: SsrcGenerator,
}

impl JingleSession {
    pub fn new(
        identity: ParticipantIdentity,
        config: SessionConfig,
        signaling: Arc<dyn SignalingChannel>,
        engine: Arc<dyn ConnectivityEngine>,
        media: Arc<dyn MediaStack>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            identity,
            config,
            signaling,
            engine,
            media,
            ssrc: SsrcGenerator::new(),
        }
    }

    /// Use `generator` for local source identifiers
    pub fn with_ssrc_generator(mut self, generator: SsrcGenerator) -> Self {
        self.ssrc = generator;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Start the control task on the current runtime
    pub fn spawn(self) -> SessionHandle {
        let (status_tx, status_rx) = watch::channel(SessionStatus::initial());
        let (events, rx) = EventSender::channel();
        let cancel = CancellationToken::new();

        let shared = Arc::new(SessionShared {
            id: self.id.clone(),
            status: status_rx,
            nickname: RwLock::new(self.identity.nickname.clone()),
            cancel: cancel.clone(),
        });

        let span = info_span!("participant", session_id = %self.id, nick = field::Empty);
        let room = RoomMembership::new(self.signaling.clone(), self.identity.host.clone());

        let task = SessionTask {
            shared: shared.clone(),
            status: status_tx,
            cancel,
            events,
            identity: self.identity,
            config: self.config,
            signaling: self.signaling,
            engine: self.engine,
            media: self.media,
            ssrc: self.ssrc,
            room,
            registry: PayloadTypeRegistry::new(),
            connectivity: None,
            streams: Vec::new(),
            accept: None,
            connected: false,
            parked: false,
            torn_down: false,
        };

        let join = tokio::spawn(task.run(rx).instrument(span));
        SessionHandle::new(shared, join)
    }
}

/// Everything the control task owns for the lifetime of a session
struct SessionTask {
    shared: Arc<SessionShared>,
    status: watch::Sender<SessionStatus>,
    cancel: CancellationToken,
    events: EventSender,
    identity: ParticipantIdentity,
    config: SessionConfig,
    signaling: Arc<dyn SignalingChannel>,
    engine: Arc<dyn ConnectivityEngine>,
    media: Arc<dyn MediaStack>,
    ssrc: SsrcGenerator,
    room: RoomMembership,
    registry: PayloadTypeRegistry,
    connectivity: Option<Box<dyn ConnectivitySession>>,
    streams: Vec<MediaStreamHandle>,
    /// The answer we sent, needed to address the terminate
    accept: Option<JingleMessage>,
    /// Signaling channel connected and not yet closed
    connected: bool,
    /// A pre-answer failure was reported; further offers are ignored
    parked: bool,
    torn_down: bool,
}

impl SessionTask {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        if let Err(e) = self.config.validate() {
            self.fail(SessionError::config(e.to_string()));
            self.teardown().await;
            return;
        }

        if self.establish().await.is_ok() {
            let cancel = self.cancel.clone();
            loop {
                let flow = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("Session cancelled in state {}", self.state());
                        Flow::Stop
                    }
                    event = events.recv() => match event {
                        Some(event) => self.handle_event(event).await,
                        None => Flow::Stop,
                    },
                };
                if flow == Flow::Stop {
                    break;
                }
            }
        }

        self.teardown().await;
        info!("Session finished");
    }

    /// Connect, join the room and announce. On success the session waits
    /// for an offer; any error has already been reported.
    async fn establish(&mut self) -> SessionResult<()> {
        self.transition(SessionState::Connecting);
        self.signaling.on_message(self.events.message_listener());

        let cancel = self.cancel.clone();
        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(SessionError::invalid_state("stopped while connecting"));
            }
            result = self.signaling.connect() => result,
        };
        if let Err(e) = connected {
            return Err(self.fail(SessionError::SignalingConnectFailure { reason: e.to_string() }));
        }
        self.connected = true;
        info!("Connected to {}", self.identity.host.xmpp_host);

        self.request_conference().await;

        self.transition(SessionState::JoiningRoom);
        let nickname = self.identity.nickname.clone();
        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(SessionError::invalid_state("stopped while joining the room"));
            }
            result = self.room.join(
                &nickname,
                self.config.nickname_marker,
                self.config.max_join_attempts,
            ) => result,
        };
        let joined = joined.map_err(|e| self.fail(e))?;

        Span::current().record("nick", joined.nickname.as_str());
        self.identity.nickname = joined.nickname.clone();
        *self.shared.nickname.write() = joined.nickname;

        self.room
            .announce(self.config.welcome_message.as_deref())
            .await
            .map_err(|e| self.fail(e))?;

        self.transition(SessionState::AwaitingOffer);
        Ok(())
    }

    /// Ask the focus to set up the conference. Failure is not fatal.
    async fn request_conference(&self) {
        let Some(focus) = self.identity.host.focus.clone() else {
            return;
        };

        let request = ConferenceRequest {
            to: focus,
            room: self.identity.room_address(),
            properties: self
                .config
                .conference
                .as_ref()
                .map(|c| c.properties())
                .unwrap_or_default(),
        };

        debug!("Requesting conference {} from {}", request.room, request.to);
        if let Err(e) = self.signaling.request_conference(request).await {
            warn!("Conference request failed, joining anyway: {}", e);
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) -> Flow {
        match event {
            SessionEvent::Signaling(message) => self.handle_message(message).await,
            SessionEvent::Connectivity(state) => self.handle_connectivity(state).await,
        }
    }

    async fn handle_message(&mut self, message: JingleMessage) -> Flow {
        acknowledge(self.signaling.as_ref(), &message).await;

        match InboundAction::from(&message.action) {
            InboundAction::Offer => {
                if self.parked || self.state() != SessionState::AwaitingOffer {
                    warn!(
                        "Ignoring {} '{}' in state {}",
                        message.action,
                        message.sid,
                        self.state()
                    );
                    return Flow::Continue;
                }
                self.accept_offer(&message).await
            }
            InboundAction::AddSource | InboundAction::RemoveSource => {
                info!("Unhandled {} from {}", message.action, message.from);
                Flow::Continue
            }
            InboundAction::Other(action) => {
                info!("Unknown Jingle action {} from {}", action, message.from);
                Flow::Continue
            }
        }
    }

    async fn accept_offer(&mut self, offer: &JingleMessage) -> Flow {
        self.transition(SessionState::Negotiating);
        info!("Received offer '{}' with {} content(s)", offer.sid, offer.contents.len());

        let cancel = self.cancel.clone();
        let answer = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Session cancelled while building the answer");
                return Flow::Stop;
            }
            answer = self.build_answer(offer) => answer,
        };
        let accept = match answer {
            Ok(accept) => accept,
            Err(e) => {
                // No answer goes out; the remote side is left waiting.
                self.fail(e);
                self.parked = true;
                return Flow::Continue;
            }
        };

        if self.config.announce_sources {
            self.announce_sources().await;
        }

        if let Err(e) = self.signaling.send_message(accept.clone()).await {
            self.fail(e.into());
            self.parked = true;
            return Flow::Continue;
        }
        info!("Sent session-accept for '{}'", accept.sid);
        self.accept = Some(accept);
        self.transition(SessionState::AwaitingConnectivity);

        let Some(connectivity) = self.connectivity.as_ref() else {
            self.fail(SessionError::invalid_state("answer sent without a connectivity session"));
            return Flow::Stop;
        };
        connectivity.on_terminal(self.events.terminal_listener());
        if let Err(e) = connectivity.start_connectivity_establishment().await {
            self.fail(SessionError::ConnectivityEstablishmentFailure { state: e.to_string() });
            return Flow::Stop;
        }
        debug!("Connectivity establishment started");

        Flow::Continue
    }

    /// Run negotiation and candidate exchange, create the streams and
    /// build the session-accept. Nothing is sent.
    async fn build_answer(&mut self, offer: &JingleMessage) -> SessionResult<JingleMessage> {
        let negotiated = negotiate_offer(&offer.contents, self.media.as_ref(), &mut self.registry)?;
        let media_types = negotiated.media_types();
        let mut contents = negotiated.contents;

        let session = self
            .engine
            .create(&media_types)
            .await
            .map_err(|e| SessionError::ConnectivityAllocationFailure { reason: e.to_string() })?;
        let session = self.connectivity.insert(session);

        let attached = attach_remote_candidates(session.as_ref(), &offer.contents)
            .await
            .map_err(|e| SessionError::CandidateGatheringFailure { reason: e.to_string() })?;
        let gathered = session
            .gather_candidates()
            .await
            .map_err(|e| SessionError::CandidateGatheringFailure { reason: e.to_string() })?;
        let harvested = harvest_local_candidates(&gathered, &mut contents);
        debug!("Attached {} remote and harvested {} local candidate(s)", attached, harvested);

        let remote = remote_fingerprints(&offer.contents);
        for content in contents.iter_mut() {
            let format = negotiated
                .selected
                .get(&content.name)
                .cloned()
                .ok_or_else(|| {
                    SessionError::invalid_state(format!(
                        "no format selected for '{}'",
                        content.name
                    ))
                })?;
            let ssrc = self.ssrc.next_ssrc();

            let stream = self
                .media
                .create_stream(&content.name, &format, ssrc, &self.registry)
                .await
                .map_err(|e| SessionError::media_activation(&content.name, e.to_string()))?;
            let mut handle = MediaStreamHandle::new(&content.name, ssrc, format, stream);

            add_source(content, ssrc);
            exchange_fingerprints(content, &mut handle, remote.get(&content.name));

            debug!("Created '{}' stream with ssrc {}", content.name, ssrc);
            self.streams.push(handle);
        }

        Ok(JingleMessage::session_accept(offer, contents))
    }

    /// Advertise the local sources in presence. Advisory only.
    async fn announce_sources(&self) {
        let sources = self
            .streams
            .iter()
            .map(|stream| MediaSource {
                media_type: stream.media_type().to_string(),
                ssrc: stream.ssrc().to_string(),
                direction: MediaDirection::SendRecv,
            })
            .collect();

        if let Err(e) = self.room.announce_sources(sources).await {
            warn!("Failed to announce media sources: {}", e);
        }
    }

    async fn handle_connectivity(&mut self, state: ConnectivityState) -> Flow {
        if self.state() != SessionState::AwaitingConnectivity {
            debug!("Ignoring connectivity state {} in state {}", state, self.state());
            return Flow::Continue;
        }

        if !state.is_connected() {
            self.fail(SessionError::ConnectivityEstablishmentFailure { state: state.to_string() });
            return Flow::Stop;
        }

        info!("Connectivity established");
        match self.activate_media().await {
            Ok(()) => {
                self.transition(SessionState::Active);
                Flow::Continue
            }
            Err(e) => {
                self.fail(e);
                Flow::Stop
            }
        }
    }

    /// Bind every stream, then bring up encryption, then start data flow
    async fn activate_media(&mut self) -> SessionResult<()> {
        let connectivity = self
            .connectivity
            .as_ref()
            .ok_or_else(|| {
                SessionError::invalid_state("no connectivity session to activate media on")
            })?;

        for stream in self.streams.iter_mut() {
            let transport = connectivity
                .selected_transport(stream.media_type())
                .ok_or_else(|| {
                    SessionError::media_activation(stream.media_type(), "no transport selected")
                })?;
            stream.bind(transport).await?;
        }
        for stream in self.streams.iter_mut() {
            stream.start_encryption().await?;
        }
        for stream in self.streams.iter_mut() {
            stream.start().await?;
            info!("Started '{}' stream ({})", stream.media_type(), stream.format());
        }

        Ok(())
    }

    /// Release everything the session holds. Runs once; every step is
    /// best-effort.
    async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if !matches!(self.state(), SessionState::Disconnected | SessionState::Connecting) {
            self.transition(SessionState::Terminating);
        }

        for stream in self.streams.iter_mut() {
            stream.stop().await;
        }

        if let Some(accept) = self.accept.take() {
            let terminate = JingleMessage::session_terminate(
                &accept,
                ReasonCondition::Gone,
                &self.config.hangup_text,
            );
            match self.signaling.send_message(terminate).await {
                Ok(()) => info!("Sent session-terminate for '{}'", accept.sid),
                Err(e) => warn!("Failed to send session-terminate: {}", e),
            }
        }

        if let Some(connectivity) = self.connectivity.take() {
            connectivity.close().await;
        }

        self.room.leave().await;

        if self.connected {
            self.connected = false;
            if let Err(e) = self.signaling.disconnect().await {
                warn!("Failed to close signaling channel: {}", e);
            }
        }

        self.transition(SessionState::Terminated);
    }

    fn state(&self) -> SessionState {
        self.status.borrow().state
    }

    fn transition(&mut self, next: SessionState) {
        let current = self.state();
        if current == next {
            return;
        }
        if !current.can_transition_to(next) {
            warn!("Refusing state change {} -> {}", current, next);
            return;
        }

        info!(from = %current, to = %next, "Session state changed");
        self.status.send_modify(|status| status.state = next);
    }

    /// Record `error` as the session's failure and hand it back
    fn fail(&self, error: SessionError) -> SessionError {
        error!(kind = error.kind(), "Session failed: {}", error);
        self.status.send_modify(|status| {
            if status.failure.is_none() {
                status.failure = Some(error.clone());
            }
        });
        error
    }
}

fn add_source(content: &mut ContentDescription, ssrc: u32) {
    if let Some(description) = content.description.as_mut() {
        description.sources.push(SourceDescription::new(ssrc));
    }
}

fn exchange_fingerprints(
    content: &mut ContentDescription,
    stream: &mut MediaStreamHandle,
    remote: Option<&Fingerprint>,
) {
    if let Some(local) = stream.local_fingerprint() {
        apply_local_fingerprint(content, local, remote);
    }
    if let Some(remote) = remote {
        stream.set_remote_fingerprint(remote.clone());
    }
}

