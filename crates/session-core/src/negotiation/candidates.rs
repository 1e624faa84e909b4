//! Candidate exchange between the negotiation messages and the ICE engine
//!
//! Both directions work on media-type labels only. A label present on one
//! side and missing on the other (the dropped data channel, typically) is
//! skipped, never an error.

use std::net::{IpAddr, SocketAddr};
use tracing::{debug, warn};

use crate::adapters::{
    CandidateType, ConnectivityError, ConnectivitySession, GatheredCandidates, IceCandidate,
    RemoteCandidates, TransportProtocol,
};
use crate::jingle::{Candidate, CandidateKind, ContentDescription};

/// Translate a wire candidate for the ICE engine.
///
/// Returns `None` for candidates with an unparsable address or an unknown
/// transport protocol.
pub fn to_ice_candidate(candidate: &Candidate) -> Option<IceCandidate> {
    let ip: IpAddr = candidate.ip.parse().ok()?;
    let transport = match candidate.protocol.to_ascii_lowercase().as_str() {
        "udp" => TransportProtocol::Udp,
        "tcp" | "ssltcp" => TransportProtocol::Tcp,
        _ => return None,
    };
    let candidate_type = match candidate.kind {
        CandidateKind::Host => CandidateType::Host,
        CandidateKind::Srflx => CandidateType::ServerReflexive,
        CandidateKind::Prflx => CandidateType::PeerReflexive,
        CandidateKind::Relay => CandidateType::Relay,
    };
    let related_address = match (&candidate.rel_addr, candidate.rel_port) {
        (Some(addr), Some(port)) => addr.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, port)),
        _ => None,
    };

    Some(IceCandidate {
        foundation: candidate.foundation.clone(),
        component: candidate.component,
        transport,
        priority: candidate.priority,
        address: SocketAddr::new(ip, candidate.port),
        candidate_type,
        related_address,
        generation: candidate.generation,
    })
}

/// Translate an ICE engine candidate into its wire form
pub fn to_jingle_candidate(candidate: &IceCandidate, id: impl Into<String>) -> Candidate {
    Candidate {
        id: id.into(),
        foundation: candidate.foundation.clone(),
        component: candidate.component,
        generation: candidate.generation,
        protocol: match candidate.transport {
            TransportProtocol::Udp => "udp".to_string(),
            TransportProtocol::Tcp => "tcp".to_string(),
        },
        priority: candidate.priority,
        ip: candidate.address.ip().to_string(),
        port: candidate.address.port(),
        kind: match candidate.candidate_type {
            CandidateType::Host => CandidateKind::Host,
            CandidateType::ServerReflexive => CandidateKind::Srflx,
            CandidateType::PeerReflexive => CandidateKind::Prflx,
            CandidateType::Relay => CandidateKind::Relay,
        },
        rel_addr: candidate.related_address.map(|addr| addr.ip().to_string()),
        rel_port: candidate.related_address.map(|addr| addr.port()),
    }
}

/// Remote credentials and translated candidates of one offered content
pub fn remote_candidates(content: &ContentDescription) -> RemoteCandidates {
    let candidates = content
        .transport
        .candidates
        .iter()
        .filter_map(|candidate| {
            let translated = to_ice_candidate(candidate);
            if translated.is_none() {
                warn!("Skipping unusable candidate {} for '{}'", candidate.id, content.name);
            }
            translated
        })
        .collect();

    RemoteCandidates {
        ufrag: content.transport.ufrag.clone(),
        pwd: content.transport.pwd.clone(),
        candidates,
    }
}

/// Register the offer's candidates with the connectivity session.
///
/// Returns the number of candidates handed to the engine.
pub async fn attach_remote_candidates(
    session: &dyn ConnectivitySession,
    remote: &[ContentDescription],
) -> Result<usize, ConnectivityError> {
    let media_types = session.media_types();
    let mut attached = 0;

    for content in remote {
        if !media_types.iter().any(|m| m == &content.name) {
            debug!("No ICE stream for '{}', skipping its remote candidates", content.name);
            continue;
        }

        let candidates = remote_candidates(content);
        attached += candidates.candidates.len();
        session.add_remote_candidates(&content.name, candidates).await?;
    }

    Ok(attached)
}

/// Copy gathered local candidates and credentials into the local contents.
///
/// Returns the number of candidates written.
pub fn harvest_local_candidates(
    gathered: &GatheredCandidates,
    local: &mut [ContentDescription],
) -> usize {
    let mut harvested = 0;

    for content in local.iter_mut() {
        let Some(local_candidates) = gathered.get(&content.name) else {
            debug!("Nothing gathered for '{}'", content.name);
            continue;
        };

        content.transport.ufrag = Some(local_candidates.ufrag.clone());
        content.transport.pwd = Some(local_candidates.pwd.clone());
        content.transport.candidates = local_candidates
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                to_jingle_candidate(candidate, format!("{}-{}", content.name, index))
            })
            .collect();
        harvested += content.transport.candidates.len();
    }

    harvested
}
