use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// First payload-type number of the dynamic range
pub const DYNAMIC_PAYLOAD_TYPE_MIN: u8 = 96;
/// Last payload-type number of the dynamic range
pub const DYNAMIC_PAYLOAD_TYPE_MAX: u8 = 127;

/// A format descriptor as carried in a content description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadType {
    /// Payload-type number
    pub id: u8,
    /// Encoding name, e.g. `opus` or `VP8`
    pub name: String,
    pub clock_rate: u32,
    /// Channel count; absent means one
    #[serde(default)]
    pub channels: Option<u8>,
    /// Format parameters (`fmtp`)
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl PayloadType {
    pub fn new(id: u8, name: impl Into<String>, clock_rate: u32) -> Self {
        Self {
            id,
            name: name.into(),
            clock_rate,
            channels: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_channels(mut self, channels: u8) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Whether the number falls in the dynamic range
    pub fn is_dynamic(&self) -> bool {
        (DYNAMIC_PAYLOAD_TYPE_MIN..=DYNAMIC_PAYLOAD_TYPE_MAX).contains(&self.id)
    }

    /// Same encoding, ignoring the payload-type number and parameters
    pub fn same_encoding(&self, other: &PayloadType) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.clock_rate == other.clock_rate
            && self.channels.unwrap_or(1) == other.channels.unwrap_or(1)
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.clock_rate)?;
        if let Some(channels) = self.channels {
            write!(f, "/{}", channels)?;
        }
        write!(f, " (pt={})", self.id)
    }
}

/// Role of the party that created a content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Creator {
    Initiator,
    Responder,
}

/// Which parties send media for a content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Senders {
    Initiator,
    Responder,
    Both,
    None,
}

/// ICE candidate type as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Host,
    Srflx,
    Prflx,
    Relay,
}

/// A transport candidate in the negotiation representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub foundation: String,
    pub component: u8,
    pub generation: u32,
    pub protocol: String,
    pub priority: u32,
    pub ip: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub kind: CandidateKind,
    #[serde(default)]
    pub rel_addr: Option<String>,
    #[serde(default)]
    pub rel_port: Option<u16>,
}

/// DTLS certificate fingerprint carried in a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Hash function, e.g. `sha-256`
    pub hash: String,
    pub value: String,
    /// DTLS role: `active`, `passive` or `actpass`
    #[serde(default)]
    pub setup: Option<String>,
}

/// ICE-UDP transport of a content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceUdpTransport {
    #[serde(default)]
    pub ufrag: Option<String>,
    #[serde(default)]
    pub pwd: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub fingerprint: Option<Fingerprint>,
    #[serde(default)]
    pub rtcp_mux: bool,
}

/// SCTP association parameters marking a data-channel content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SctpMap {
    pub port: u16,
    pub protocol: String,
    pub streams: u16,
}

/// A media source (SSRC) advertised in a content description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescription {
    pub ssrc: u32,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl SourceDescription {
    pub fn new(ssrc: u32) -> Self {
        Self {
            ssrc,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// RTP application description of a content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtpDescription {
    pub media: String,
    #[serde(default)]
    pub payload_types: Vec<PayloadType>,
    #[serde(default)]
    pub sources: Vec<SourceDescription>,
}

impl RtpDescription {
    pub fn new(media: impl Into<String>) -> Self {
        Self {
            media: media.into(),
            payload_types: Vec::new(),
            sources: Vec::new(),
        }
    }
}

/// One content of an offer or answer, keyed by its media-type label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescription {
    /// Media-type label (`audio`, `video`, `data`)
    pub name: String,
    pub creator: Creator,
    pub senders: Senders,
    #[serde(default)]
    pub description: Option<RtpDescription>,
    #[serde(default)]
    pub transport: IceUdpTransport,
    /// Present on data-channel contents
    #[serde(default)]
    pub sctp_map: Option<SctpMap>,
}

impl ContentDescription {
    pub fn new(name: impl Into<String>, creator: Creator, senders: Senders) -> Self {
        Self {
            name: name.into(),
            creator,
            senders,
            description: None,
            transport: IceUdpTransport::default(),
            sctp_map: None,
        }
    }

    pub fn with_description(mut self, description: RtpDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_transport(mut self, transport: IceUdpTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_sctp_map(mut self, sctp_map: SctpMap) -> Self {
        self.sctp_map = Some(sctp_map);
        self
    }

    /// Offered formats, in offer order
    pub fn payload_types(&self) -> &[PayloadType] {
        self.description
            .as_ref()
            .map(|d| d.payload_types.as_slice())
            .unwrap_or(&[])
    }

    /// Whether this content describes the data channel
    pub fn is_data_channel(&self) -> bool {
        crate::types::is_data_media(&self.name) || self.sctp_map.is_some()
    }
}
