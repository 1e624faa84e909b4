//! In-memory collaborators for session integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hammer_session_core::adapters::{
    CandidateType, ConnectivityEngine, ConnectivityError, ConnectivitySession, ConnectivityState,
    EstablishedTransport, GatheredCandidates, IceCandidate, JoinError, LocalCandidates, MediaError,
    MediaStack, MediaStream, MessageListener, RemoteCandidates, SignalingChannel, SignalingError,
    TerminalListener, TransportProtocol,
};
use hammer_session_core::jingle::{
    Acknowledgement, Candidate, CandidateKind, ConferenceRequest, ContentDescription, Creator,
    Fingerprint, IceUdpTransport, JingleAction, JingleMessage, PayloadType, Presence,
    RtpDescription, SctpMap, Senders,
};
use hammer_session_core::{
    HostInfo, JingleSession, ParticipantIdentity, PayloadTypeRegistry, SessionConfig, SessionHandle,
};

pub const FOCUS_JID: &str = "loadtest@conference.example.com/focus";

pub fn host() -> HostInfo {
    HostInfo::new("xmpp.example.com", "example.com", "loadtest", "conference.example.com")
}

/// Everything a signaling double was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Conference(ConferenceRequest),
    Join { room: String, nickname: String },
    Leave,
    GroupMessage(String),
    Presence(Presence),
    Message(JingleMessage),
    Ack(Acknowledgement),
    Disconnect,
}

/// Signaling channel double with scripted join results
#[derive(Default)]
pub struct MockSignaling {
    connect_error: Option<SignalingError>,
    join_script: Mutex<VecDeque<Result<(), JoinError>>>,
    sent: Mutex<Vec<Sent>>,
    listener: Mutex<Option<MessageListener>>,
}

impl MockSignaling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect(reason: &str) -> Self {
        Self {
            connect_error: Some(SignalingError::Connect(reason.to_string())),
            ..Self::default()
        }
    }

    /// Answer the next join requests with these results, then succeed
    pub fn with_join_results(self, results: Vec<Result<(), JoinError>>) -> Self {
        *self.join_script.lock() = results.into();
        self
    }

    /// Hand `message` to the session as if it arrived from the network
    pub fn deliver(&self, message: JingleMessage) {
        let listener = self.listener.lock().clone();
        match listener {
            Some(listener) => listener(message),
            None => panic!("no message listener registered"),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn joins(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Join { nickname, .. } => Some(nickname),
                _ => None,
            })
            .collect()
    }

    pub fn presences(&self) -> Vec<Presence> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Presence(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self, action: JingleAction) -> Vec<JingleMessage> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message(m) if m.action == action => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn acks(&self) -> Vec<Acknowledgement> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Ack(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Sent) -> usize {
        self.sent().iter().filter(|s| *s == wanted).count()
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().push(sent);
    }
}

#[async_trait]
impl SignalingChannel for MockSignaling {
    async fn connect(&self) -> Result<(), SignalingError> {
        match &self.connect_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn request_conference(&self, request: ConferenceRequest) -> Result<(), SignalingError> {
        self.record(Sent::Conference(request));
        Ok(())
    }

    async fn join_room(&self, room: &str, nickname: &str) -> Result<(), JoinError> {
        self.record(Sent::Join {
            room: room.to_string(),
            nickname: nickname.to_string(),
        });
        self.join_script.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn leave_room(&self) -> Result<(), SignalingError> {
        self.record(Sent::Leave);
        Ok(())
    }

    async fn send_group_message(&self, body: &str) -> Result<(), SignalingError> {
        self.record(Sent::GroupMessage(body.to_string()));
        Ok(())
    }

    async fn send_presence(&self, presence: Presence) -> Result<(), SignalingError> {
        self.record(Sent::Presence(presence));
        Ok(())
    }

    async fn send_message(&self, message: JingleMessage) -> Result<(), SignalingError> {
        self.record(Sent::Message(message));
        Ok(())
    }

    async fn send_ack(&self, ack: Acknowledgement) -> Result<(), SignalingError> {
        self.record(Sent::Ack(ack));
        Ok(())
    }

    fn on_message(&self, listener: MessageListener) {
        *self.listener.lock() = Some(listener);
    }

    async fn disconnect(&self) -> Result<(), SignalingError> {
        self.record(Sent::Disconnect);
        Ok(())
    }
}

/// Shared state of one mock connectivity session
#[derive(Default)]
pub struct MockIce {
    pub media_types: Vec<String>,
    pub remote: Mutex<HashMap<String, RemoteCandidates>>,
    listener: Mutex<Option<TerminalListener>>,
    terminal: Mutex<Option<ConnectivityState>>,
    pub establishment_started: AtomicUsize,
    pub closes: AtomicUsize,
}

impl MockIce {
    /// Report a terminal state, firing the registered listener if any
    pub fn finish(&self, state: ConnectivityState) {
        *self.terminal.lock() = Some(state);
        let listener = self.listener.lock().take();
        if let Some(listener) = listener {
            listener(state);
        }
    }
}

struct MockIceSession(Arc<MockIce>);

#[async_trait]
impl ConnectivitySession for MockIceSession {
    fn media_types(&self) -> Vec<String> {
        self.0.media_types.clone()
    }

    async fn add_remote_candidates(
        &self,
        media_type: &str,
        remote: RemoteCandidates,
    ) -> Result<(), ConnectivityError> {
        self.0.remote.lock().insert(media_type.to_string(), remote);
        Ok(())
    }

    async fn gather_candidates(&self) -> Result<GatheredCandidates, ConnectivityError> {
        Ok(self
            .0
            .media_types
            .iter()
            .enumerate()
            .map(|(index, media_type)| {
                let address: SocketAddr = format!("10.0.0.1:{}", 10000 + index * 2)
                    .parse()
                    .expect("valid address");
                let local = LocalCandidates {
                    ufrag: format!("ufrag-{}", media_type),
                    pwd: format!("pwd-{}", media_type),
                    candidates: vec![IceCandidate {
                        foundation: "1".into(),
                        component: 1,
                        transport: TransportProtocol::Udp,
                        priority: 2130706431,
                        address,
                        candidate_type: CandidateType::Host,
                        related_address: None,
                        generation: 0,
                    }],
                };
                (media_type.clone(), local)
            })
            .collect())
    }

    async fn start_connectivity_establishment(&self) -> Result<(), ConnectivityError> {
        self.0.establishment_started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_terminal(&self, listener: TerminalListener) {
        let terminal = *self.0.terminal.lock();
        match terminal {
            Some(state) => listener(state),
            None => *self.0.listener.lock() = Some(listener),
        }
    }

    fn selected_transport(&self, _media_type: &str) -> Option<EstablishedTransport> {
        match *self.0.terminal.lock() {
            Some(ConnectivityState::Connected) => Some(EstablishedTransport {
                local: "10.0.0.1:10000".parse().expect("valid address"),
                remote: "10.0.0.2:20000".parse().expect("valid address"),
            }),
            _ => None,
        }
    }

    async fn close(&self) {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Connectivity engine double; keeps every session it allocates
#[derive(Default)]
pub struct MockConnectivity {
    exhausted: bool,
    stalled: bool,
    sessions: Mutex<Vec<Arc<MockIce>>>,
}

impl MockConnectivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exhausted() -> Self {
        Self {
            exhausted: true,
            ..Self::default()
        }
    }

    /// An engine whose allocations never complete
    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::default()
        }
    }

    pub fn sessions(&self) -> Vec<Arc<MockIce>> {
        self.sessions.lock().clone()
    }

    pub fn last(&self) -> Arc<MockIce> {
        self.sessions.lock().last().cloned().expect("no connectivity session allocated")
    }
}

#[async_trait]
impl ConnectivityEngine for MockConnectivity {
    async fn create(
        &self,
        media_types: &[String],
    ) -> Result<Box<dyn ConnectivitySession>, ConnectivityError> {
        if self.exhausted {
            return Err(ConnectivityError::ResourceExhausted("no ports left".into()));
        }
        if self.stalled {
            std::future::pending::<()>().await;
        }
        let ice = Arc::new(MockIce {
            media_types: media_types.to_vec(),
            ..MockIce::default()
        });
        self.sessions.lock().push(ice.clone());
        Ok(Box::new(MockIceSession(ice)))
    }
}

/// What happened to one stream created by the media double
#[derive(Default)]
pub struct StreamRecord {
    pub media_type: String,
    pub ssrc: u32,
    pub format: Option<PayloadType>,
    pub steps: Mutex<Vec<&'static str>>,
    pub remote_fingerprint: Mutex<Option<Fingerprint>>,
}

impl StreamRecord {
    pub fn steps(&self) -> Vec<&'static str> {
        self.steps.lock().clone()
    }
}

struct MockStream {
    record: Arc<StreamRecord>,
    fail_encryption: bool,
}

#[async_trait]
impl MediaStream for MockStream {
    fn local_fingerprint(&self) -> Option<Fingerprint> {
        Some(Fingerprint {
            hash: "sha-256".into(),
            value: format!("local-{}", self.record.media_type),
            setup: None,
        })
    }

    fn set_remote_fingerprint(&mut self, fingerprint: Fingerprint) {
        *self.record.remote_fingerprint.lock() = Some(fingerprint);
    }

    async fn bind_transport(&mut self, _transport: EstablishedTransport) -> Result<(), MediaError> {
        self.record.steps.lock().push("bound");
        Ok(())
    }

    async fn start_encrypted_transport(&mut self, _media_type: &str) -> Result<(), MediaError> {
        if self.fail_encryption {
            return Err(MediaError::Encryption("handshake failed".into()));
        }
        self.record.steps.lock().push("encrypted");
        Ok(())
    }

    async fn start(&mut self) -> Result<(), MediaError> {
        self.record.steps.lock().push("started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), MediaError> {
        self.record.steps.lock().push("stopped");
        Ok(())
    }
}

/// Media stack double supporting a fixed set of encoding names
pub struct MockMedia {
    supported: Vec<String>,
    fail_encryption_for: Option<String>,
    streams: Mutex<Vec<Arc<StreamRecord>>>,
}

impl MockMedia {
    pub fn supporting(names: &[&str]) -> Self {
        Self {
            supported: names.iter().map(|n| n.to_string()).collect(),
            fail_encryption_for: None,
            streams: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_encryption(mut self, media_type: &str) -> Self {
        self.fail_encryption_for = Some(media_type.to_string());
        self
    }

    pub fn streams(&self) -> Vec<Arc<StreamRecord>> {
        self.streams.lock().clone()
    }

    pub fn stream(&self, media_type: &str) -> Arc<StreamRecord> {
        self.streams
            .lock()
            .iter()
            .find(|s| s.media_type == media_type)
            .cloned()
            .expect("stream was created")
    }
}

#[async_trait]
impl MediaStack for MockMedia {
    fn supports_format(&self, _media_type: &str, format: &PayloadType) -> bool {
        self.supported.iter().any(|name| name.eq_ignore_ascii_case(&format.name))
    }

    async fn create_stream(
        &self,
        media_type: &str,
        format: &PayloadType,
        ssrc: u32,
        _registry: &PayloadTypeRegistry,
    ) -> Result<Box<dyn MediaStream>, MediaError> {
        let record = Arc::new(StreamRecord {
            media_type: media_type.to_string(),
            ssrc,
            format: Some(format.clone()),
            ..StreamRecord::default()
        });
        self.streams.lock().push(record.clone());
        Ok(Box::new(MockStream {
            record,
            fail_encryption: self.fail_encryption_for.as_deref() == Some(media_type),
        }))
    }
}

/// A session wired to fresh doubles
pub struct Harness {
    pub signaling: Arc<MockSignaling>,
    pub connectivity: Arc<MockConnectivity>,
    pub media: Arc<MockMedia>,
    pub handle: SessionHandle,
}

impl Harness {
    pub fn spawn(
        signaling: MockSignaling,
        connectivity: MockConnectivity,
        media: MockMedia,
    ) -> Self {
        Self::spawn_with(signaling, connectivity, media, host(), SessionConfig::default())
    }

    pub fn spawn_with(
        signaling: MockSignaling,
        connectivity: MockConnectivity,
        media: MockMedia,
        host: HostInfo,
        config: SessionConfig,
    ) -> Self {
        init_tracing();
        let signaling = Arc::new(signaling);
        let connectivity = Arc::new(connectivity);
        let media = Arc::new(media);
        let session = JingleSession::new(
            ParticipantIdentity::new(host, "hammer-0"),
            config,
            signaling.clone(),
            connectivity.clone(),
            media.clone(),
        );
        Self {
            signaling,
            connectivity,
            media,
            handle: session.spawn(),
        }
    }
}

/// Route session logs through the test harness; `RUST_LOG` picks the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Bound on every wait in these tests
pub const WAIT: Duration = Duration::from_secs(5);

pub fn wire_candidate(ip: &str, port: u16) -> Candidate {
    Candidate {
        id: format!("remote-{}", port),
        foundation: "1".into(),
        component: 1,
        generation: 0,
        protocol: "udp".into(),
        priority: 2130706431,
        ip: ip.into(),
        port,
        kind: CandidateKind::Host,
        rel_addr: None,
        rel_port: None,
    }
}

pub fn rtp_content(name: &str, formats: Vec<PayloadType>, port: u16) -> ContentDescription {
    let mut description = RtpDescription::new(name);
    description.payload_types = formats;
    ContentDescription::new(name, Creator::Initiator, Senders::Both)
        .with_description(description)
        .with_transport(IceUdpTransport {
            ufrag: Some(format!("remote-ufrag-{}", name)),
            pwd: Some(format!("remote-pwd-{}", name)),
            candidates: vec![wire_candidate("192.0.2.10", port)],
            fingerprint: Some(Fingerprint {
                hash: "sha-256".into(),
                value: format!("remote-{}", name),
                setup: Some("actpass".into()),
            }),
            rtcp_mux: true,
        })
}

pub fn data_content() -> ContentDescription {
    ContentDescription::new("data", Creator::Initiator, Senders::Both)
        .with_transport(IceUdpTransport {
            candidates: vec![wire_candidate("192.0.2.10", 5000)],
            ..IceUdpTransport::default()
        })
        .with_sctp_map(SctpMap {
            port: 5000,
            protocol: "webrtc-datachannel".into(),
            streams: 1024,
        })
}

pub fn offer(contents: Vec<ContentDescription>) -> JingleMessage {
    JingleMessage::new(
        "offer-1",
        FOCUS_JID,
        "hammer-0@example.com/res",
        "sid-42",
        JingleAction::SessionInitiate,
    )
    .with_contents(contents)
}

/// audio: opus pt=96, video: VP8 pt=100, plus a data channel
pub fn standard_offer() -> JingleMessage {
    offer(vec![
        rtp_content("audio", vec![PayloadType::new(96, "opus", 48000).with_channels(2)], 4000),
        rtp_content("video", vec![PayloadType::new(100, "VP8", 90000)], 4002),
        data_content(),
    ])
}

/// Poll `condition` until it holds; panics after [`WAIT`]
pub async fn eventually(condition: impl Fn() -> bool) {
    let result = tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(result.is_ok(), "condition not met within {:?}", WAIT);
}
