//! Media stream handles and local source identifiers

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::adapters::{EstablishedTransport, MediaStream};
use crate::errors::{SessionError, SessionResult};
use crate::jingle::{Fingerprint, PayloadType};

/// Generates the local source identifiers of one session.
///
/// Identifiers are non-zero and never repeat within the generator.
#[derive(Debug)]
pub struct SsrcGenerator {
    rng: StdRng,
    issued: HashSet<u32>,
}

impl SsrcGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            issued: HashSet::new(),
        }
    }

    /// Deterministic generator, for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            issued: HashSet::new(),
        }
    }

    pub fn next_ssrc(&mut self) -> u32 {
        loop {
            let ssrc: u32 = self.rng.gen();
            if ssrc != 0 && self.issued.insert(ssrc) {
                return ssrc;
            }
        }
    }
}

impl Default for SsrcGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress of one media stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Created,
    Bound,
    Encrypted,
    Started,
    Stopped,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Bound => write!(f, "bound"),
            Self::Encrypted => write!(f, "encrypted"),
            Self::Started => write!(f, "started"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// One negotiated media type's stream, owned by its session
pub struct MediaStreamHandle {
    media_type: String,
    ssrc: u32,
    format: PayloadType,
    state: StreamState,
    stream: Box<dyn MediaStream>,
}

impl MediaStreamHandle {
    pub fn new(
        media_type: impl Into<String>,
        ssrc: u32,
        format: PayloadType,
        stream: Box<dyn MediaStream>,
    ) -> Self {
        Self {
            media_type: media_type.into(),
            ssrc,
            format,
            state: StreamState::Created,
            stream,
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn format(&self) -> &PayloadType {
        &self.format
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn local_fingerprint(&self) -> Option<Fingerprint> {
        self.stream.local_fingerprint()
    }

    pub fn set_remote_fingerprint(&mut self, fingerprint: Fingerprint) {
        self.stream.set_remote_fingerprint(fingerprint);
    }

    pub async fn bind(&mut self, transport: EstablishedTransport) -> SessionResult<()> {
        self.stream
            .bind_transport(transport)
            .await
            .map_err(|e| SessionError::media_activation(&self.media_type, e.to_string()))?;
        debug!("Bound '{}' stream to {} -> {}", self.media_type, transport.local, transport.remote);
        self.state = StreamState::Bound;
        Ok(())
    }

    pub async fn start_encryption(&mut self) -> SessionResult<()> {
        self.stream
            .start_encrypted_transport(&self.media_type)
            .await
            .map_err(|e| SessionError::media_activation(&self.media_type, e.to_string()))?;
        self.state = StreamState::Encrypted;
        Ok(())
    }

    pub async fn start(&mut self) -> SessionResult<()> {
        self.stream
            .start()
            .await
            .map_err(|e| SessionError::media_activation(&self.media_type, e.to_string()))?;
        self.state = StreamState::Started;
        Ok(())
    }

    /// Stop the stream. Errors are logged and swallowed; a second call is a no-op.
    pub async fn stop(&mut self) {
        if self.state == StreamState::Stopped {
            return;
        }
        if let Err(e) = self.stream.stop().await {
            warn!("Stopping '{}' stream failed: {}", self.media_type, e);
        }
        self.state = StreamState::Stopped;
    }
}

impl fmt::Debug for MediaStreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStreamHandle")
            .field("media_type", &self.media_type)
            .field("ssrc", &self.ssrc)
            .field("format", &self.format)
            .field("state", &self.state)
            .finish()
    }
}
