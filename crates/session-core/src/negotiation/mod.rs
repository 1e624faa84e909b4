//! Offer/answer negotiation logic
//!
//! Pure functions and per-session values used while answering an offer:
//! - [`registry`]: dynamic payload numbers learned from the offer
//! - [`format`]: format selection and local content construction
//! - [`candidates`]: candidate translation between the wire and the ICE engine
//! - [`dtls`]: fingerprint exchange between offer, answer and streams

pub mod candidates;
pub mod dtls;
pub mod format;
pub mod registry;

pub use candidates::{attach_remote_candidates, harvest_local_candidates};
pub use format::{negotiate_offer, select_format, MediaOffer, NegotiatedOffer, SelectedFormat};
pub use registry::PayloadTypeRegistry;
