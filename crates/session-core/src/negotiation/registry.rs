use std::collections::BTreeMap;
use tracing::warn;

use crate::jingle::PayloadType;

/// Dynamic payload numbers learned while parsing an offer.
///
/// Append-only and scoped to one session: numbers recorded from the offer
/// are reused verbatim when the answer is built, so both sides agree on the
/// numbering.
#[derive(Debug, Clone, Default)]
pub struct PayloadTypeRegistry {
    entries: BTreeMap<u8, PayloadType>,
}

impl PayloadTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a payload type seen in an offer.
    ///
    /// Static numbers are not recorded. A number already bound to another
    /// encoding keeps its first binding. Returns whether a new entry was added.
    pub fn register(&mut self, payload_type: &PayloadType) -> bool {
        if !payload_type.is_dynamic() {
            return false;
        }

        match self.entries.get(&payload_type.id) {
            Some(existing) if existing.same_encoding(payload_type) => false,
            Some(existing) => {
                warn!(
                    "Payload type {} already bound to {}, ignoring {}",
                    payload_type.id, existing, payload_type
                );
                false
            }
            None => {
                self.entries.insert(payload_type.id, payload_type.clone());
                true
            }
        }
    }

    pub fn get(&self, id: u8) -> Option<&PayloadType> {
        self.entries.get(&id)
    }

    /// Number recorded for an encoding, if any
    pub fn payload_type_for(&self, format: &PayloadType) -> Option<u8> {
        self.entries
            .values()
            .find(|entry| entry.same_encoding(format))
            .map(|entry| entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PayloadType> {
        self.entries.values()
    }
}
