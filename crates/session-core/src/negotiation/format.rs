//! Format selection and local content construction
//!
//! Selection policy: the first format, in offer order, that the local media
//! stack supports. An offer entry with no supported format fails the whole
//! negotiation; no partial answer is ever built.

use std::collections::BTreeMap;
use tracing::{debug, info};

use super::registry::PayloadTypeRegistry;
use crate::adapters::MediaStack;
use crate::errors::{SessionError, SessionResult};
use crate::jingle::{
    ContentDescription, Creator, IceUdpTransport, PayloadType, RtpDescription, Senders,
};

/// Formats offered per media-type label, in offer order
pub type MediaOffer = BTreeMap<String, Vec<PayloadType>>;

/// The one format chosen per media-type label
pub type SelectedFormat = BTreeMap<String, PayloadType>;

/// Result of negotiating an offer
#[derive(Debug, Clone)]
pub struct NegotiatedOffer {
    pub media_offer: MediaOffer,
    pub selected: SelectedFormat,
    /// Local contents in offer order, data channel excluded
    pub contents: Vec<ContentDescription>,
}

impl NegotiatedOffer {
    /// Labels of the media types that will get a stream
    pub fn media_types(&self) -> Vec<String> {
        self.contents.iter().map(|c| c.name.clone()).collect()
    }
}

/// Pick the first offered format the media stack supports
pub fn select_format(
    media_type: &str,
    offered: &[PayloadType],
    stack: &dyn MediaStack,
) -> SessionResult<PayloadType> {
    offered
        .iter()
        .find(|format| stack.supports_format(media_type, format))
        .cloned()
        .ok_or_else(|| SessionError::unsupported_format(media_type))
}

/// Local content for a negotiated media type.
///
/// `format` comes straight out of this media type's offer and keeps the
/// number it was offered under.
pub fn describe_content(media_type: &str, format: &PayloadType) -> ContentDescription {
    let mut description = RtpDescription::new(media_type);
    description.payload_types.push(format.clone());

    ContentDescription::new(media_type, Creator::Responder, Senders::Both)
        .with_description(description)
}

/// Placeholder content acknowledging a data-channel offer
pub fn describe_data_content(name: &str) -> ContentDescription {
    ContentDescription::new(name, Creator::Responder, Senders::Both)
}

/// Negotiate every content of an offer.
///
/// Dynamic payload numbers are recorded in `registry` before any local
/// content is built. The data-channel content gets a placeholder that is
/// dropped before the result is returned.
pub fn negotiate_offer(
    offer: &[ContentDescription],
    stack: &dyn MediaStack,
    registry: &mut PayloadTypeRegistry,
) -> SessionResult<NegotiatedOffer> {
    let mut media_offer = MediaOffer::new();
    let mut selected = SelectedFormat::new();
    let mut contents = Vec::with_capacity(offer.len());

    for remote in offer {
        if remote.is_data_channel() {
            debug!("Content '{}' is the data channel, using placeholder description", remote.name);
            contents.push(describe_data_content(&remote.name));
            continue;
        }

        let formats = remote.payload_types().to_vec();
        for format in &formats {
            registry.register(format);
        }

        let format = select_format(&remote.name, &formats, stack)?;
        info!("Selected {} for '{}'", format, remote.name);

        let mut content = describe_content(&remote.name, &format);
        content.transport = IceUdpTransport {
            rtcp_mux: remote.transport.rtcp_mux,
            ..IceUdpTransport::default()
        };

        media_offer.insert(remote.name.clone(), formats);
        selected.insert(remote.name.clone(), format);
        contents.push(content);
    }

    // The data channel never gets a stream, so it is left out of the answer.
    contents.retain(|content| !content.is_data_channel() && selected.contains_key(&content.name));

    Ok(NegotiatedOffer {
        media_offer,
        selected,
        contents,
    })
}
