//! DTLS fingerprint exchange

use std::collections::HashMap;

use crate::jingle::{ContentDescription, Fingerprint};

/// Fingerprints announced in the offer, keyed by media-type label
pub fn remote_fingerprints(remote: &[ContentDescription]) -> HashMap<String, Fingerprint> {
    remote
        .iter()
        .filter_map(|content| {
            content
                .transport
                .fingerprint
                .clone()
                .map(|fingerprint| (content.name.clone(), fingerprint))
        })
        .collect()
}

/// DTLS role taken by the answerer given the offerer's `setup`
pub fn answer_setup(remote_setup: Option<&str>) -> &'static str {
    match remote_setup {
        Some("active") => "passive",
        _ => "active",
    }
}

/// Write the local fingerprint into an answer content.
///
/// The setup role is derived from the offer's fingerprint for the same
/// content when there is one.
pub fn apply_local_fingerprint(
    content: &mut ContentDescription,
    local: Fingerprint,
    remote: Option<&Fingerprint>,
) {
    let setup = answer_setup(remote.and_then(|fp| fp.setup.as_deref()));
    content.transport.fingerprint = Some(Fingerprint {
        setup: Some(setup.to_string()),
        ..local
    });
}
