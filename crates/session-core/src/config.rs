//! Configuration for participant sessions and the load driver
//!
//! ```text
//! ┌──────────────────────────┐
//! │       HammerConfig       │
//! │  host ─────────── HostInfo (server + room addressing)
//! │  conference ───── ConferenceInfo (focus properties)
//! │  session ──────── SessionConfig (per-participant knobs)
//! │  logging ──────── LoggingConfig
//! └──────────────────────────┘
//! ```
//!
//! A `HammerConfig` is usually read from TOML:
//!
//! ```toml
//! participants = 20
//! nickname_prefix = "hammer-"
//! stagger_ms = 250
//!
//! [host]
//! xmpp_host = "meet.example.com"
//! xmpp_domain = "guest.example.com"
//! room_name = "loadtest"
//! muc_domain = "conference.example.com"
//! focus = "focus.example.com"
//!
//! [conference]
//! openSctp = "true"
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::Path;
use std::time::Duration;

use hammer_infra_common::{Error as InfraError, ErrorExt, LoggingConfig};
use serde::{Deserialize, Serialize};

/// Default XMPP client port
pub const DEFAULT_XMPP_PORT: u16 = 5222;

/// Signaling server and room addressing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Host name of the XMPP server to connect to
    pub xmpp_host: String,
    /// XMPP domain served by that host
    pub xmpp_domain: String,
    /// Client port of the XMPP server
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name of the shared chat room
    pub room_name: String,
    /// Domain of the multi-user chat service
    pub muc_domain: String,
    /// Address of the conference focus, if one must be asked for the room
    #[serde(default)]
    pub focus: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_XMPP_PORT
}

impl HostInfo {
    pub fn new(
        xmpp_host: impl Into<String>,
        xmpp_domain: impl Into<String>,
        room_name: impl Into<String>,
        muc_domain: impl Into<String>,
    ) -> Self {
        Self {
            xmpp_host: xmpp_host.into(),
            xmpp_domain: xmpp_domain.into(),
            port: DEFAULT_XMPP_PORT,
            room_name: room_name.into(),
            muc_domain: muc_domain.into(),
            focus: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }

    /// `room@muc-domain`
    pub fn room_address(&self) -> String {
        format!("{}@{}", self.room_name, self.muc_domain)
    }

    /// `room@muc-domain/nickname`
    pub fn occupant_address(&self, nickname: &str) -> String {
        format!("{}/{}", self.room_address(), nickname)
    }
}

/// Conference properties sent to the focus when requesting the room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceInfo {
    pub channel_last_n: Option<String>,
    pub adaptive_last_n: Option<String>,
    pub disable_adaptive_simulcast: Option<String>,
    pub open_sctp: Option<String>,
    pub start_audio_muted: Option<String>,
    pub start_video_muted: Option<String>,
    pub simulcast_mode: Option<String>,
    pub enable_lip_sync: Option<String>,
}

impl ConferenceInfo {
    /// The properties that are set, under their wire names
    pub fn properties(&self) -> Vec<(String, String)> {
        [
            ("channelLastN", &self.channel_last_n),
            ("adaptiveLastN", &self.adaptive_last_n),
            ("disableAdaptiveSimulcast", &self.disable_adaptive_simulcast),
            ("openSctp", &self.open_sctp),
            ("startAudioMuted", &self.start_audio_muted),
            ("startVideoMuted", &self.start_video_muted),
            ("simulcastMode", &self.simulcast_mode),
            ("enableLipSync", &self.enable_lip_sync),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }
}

/// Per-participant session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Appended to the nickname each time the room reports it as taken
    pub nickname_marker: char,
    /// Total join attempts allowed before giving up on finding a free nickname
    pub max_join_attempts: u32,
    /// Chat message sent to the room after joining; `None` sends nothing
    pub welcome_message: Option<String>,
    /// Text carried by the session-terminate message
    pub hangup_text: String,
    /// Send a presence listing the local media sources after answering
    pub announce_sources: bool,
    /// Properties for the focus conference request
    pub conference: Option<ConferenceInfo>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            nickname_marker: '_',
            max_join_attempts: 64,
            welcome_message: Some("Hello World!".to_string()),
            hangup_text: "Bye Bye".to_string(),
            announce_sources: true,
            conference: None,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nickname_marker(mut self, marker: char) -> Self {
        self.nickname_marker = marker;
        self
    }

    pub fn with_max_join_attempts(mut self, attempts: u32) -> Self {
        self.max_join_attempts = attempts;
        self
    }

    pub fn with_welcome_message(mut self, message: Option<String>) -> Self {
        self.welcome_message = message;
        self
    }

    pub fn with_hangup_text(mut self, text: impl Into<String>) -> Self {
        self.hangup_text = text.into();
        self
    }

    pub fn with_announce_sources(mut self, announce: bool) -> Self {
        self.announce_sources = announce;
        self
    }

    pub fn with_conference(mut self, conference: ConferenceInfo) -> Self {
        self.conference = Some(conference);
        self
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.max_join_attempts == 0 {
            return Err(InfraError::Config("max_join_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Load-driver settings
#[derive(Debug, Clone, Deserialize)]
pub struct HammerConfig {
    pub host: HostInfo,
    #[serde(default)]
    pub conference: ConferenceInfo,
    /// Number of participant sessions to run
    #[serde(default = "default_participants")]
    pub participants: usize,
    /// Nickname prefix; participant `i` starts as `prefix + i`
    #[serde(default = "default_nickname_prefix")]
    pub nickname_prefix: String,
    /// Delay between two session launches, in milliseconds
    #[serde(default)]
    pub stagger_ms: u64,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_participants() -> usize {
    1
}

fn default_nickname_prefix() -> String {
    "hammer-".to_string()
}

impl HammerConfig {
    pub fn new(host: HostInfo) -> Self {
        Self {
            host,
            conference: ConferenceInfo::default(),
            participants: default_participants(),
            nickname_prefix: default_nickname_prefix(),
            stagger_ms: 0,
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_participants(mut self, participants: usize) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_nickname_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.nickname_prefix = prefix.into();
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger_ms = stagger.as_millis() as u64;
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_conference(mut self, conference: ConferenceInfo) -> Self {
        self.conference = conference;
        self
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    /// Nickname participant `index` starts with
    pub fn nickname_for(&self, index: usize) -> String {
        format!("{}{}", self.nickname_prefix, index)
    }

    /// Session settings for one participant, carrying the conference properties
    pub fn session_config(&self) -> SessionConfig {
        let mut session = self.session.clone();
        if session.conference.is_none() && !self.conference.properties().is_empty() {
            session.conference = Some(self.conference.clone());
        }
        session
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, InfraError> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| InfraError::Config(format!("invalid hammer config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InfraError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(InfraError::from)
            .with_context("config", format!("read {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.participants == 0 {
            return Err(InfraError::Config("participants must be at least 1".to_string()));
        }
        if self.host.room_name.is_empty() || self.host.muc_domain.is_empty() {
            return Err(InfraError::Config("room_name and muc_domain are required".to_string()));
        }
        if self.host.xmpp_host.is_empty() || self.host.xmpp_domain.is_empty() {
            return Err(InfraError::Config("xmpp_host and xmpp_domain are required".to_string()));
        }
        self.session.validate()
    }
}
