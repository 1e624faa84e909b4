use async_trait::async_trait;
use thiserror::Error;

use super::connectivity::EstablishedTransport;
use crate::jingle::{Fingerprint, PayloadType};
use crate::negotiation::PayloadTypeRegistry;

/// Errors reported by the media stack
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("unsupported format {0}")]
    UnsupportedFormat(String),

    #[error("stream creation failed: {0}")]
    Creation(String),

    #[error("transport binding failed: {0}")]
    Transport(String),

    #[error("encrypted transport failed: {0}")]
    Encryption(String),

    #[error("stream start failed: {0}")]
    Start(String),

    #[error("stream stop failed: {0}")]
    Stop(String),
}

/// The local media stack: format support and stream factory
#[async_trait]
pub trait MediaStack: Send + Sync {
    /// Whether the stack can send and receive `format` for `media_type`
    fn supports_format(&self, media_type: &str, format: &PayloadType) -> bool;

    /// Create a stream for `media_type` using `format`.
    ///
    /// `registry` holds the dynamic payload numbers learned from the offer;
    /// the stream must use them unchanged.
    async fn create_stream(
        &self,
        media_type: &str,
        format: &PayloadType,
        ssrc: u32,
        registry: &PayloadTypeRegistry,
    ) -> Result<Box<dyn MediaStream>, MediaError>;
}

/// A stream produced by the media stack
#[async_trait]
pub trait MediaStream: Send + Sync {
    /// Local DTLS fingerprint to publish in the answer, if the stream encrypts
    fn local_fingerprint(&self) -> Option<Fingerprint>;

    /// Fingerprint the remote side announced in its offer
    fn set_remote_fingerprint(&mut self, fingerprint: Fingerprint);

    async fn bind_transport(&mut self, transport: EstablishedTransport) -> Result<(), MediaError>;

    async fn start_encrypted_transport(&mut self, media_type: &str) -> Result<(), MediaError>;

    async fn start(&mut self) -> Result<(), MediaError>;

    async fn stop(&mut self) -> Result<(), MediaError>;
}
