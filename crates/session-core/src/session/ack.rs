//! Acknowledgement responder

use tracing::{debug, warn};

use crate::adapters::SignalingChannel;
use crate::jingle::{Acknowledgement, JingleMessage};

/// Send the "received" acknowledgement for `message` back to its sender.
///
/// A failed send is logged only; the message is still processed.
pub async fn acknowledge(signaling: &dyn SignalingChannel, message: &JingleMessage) {
    let ack = Acknowledgement::for_message(message);
    match signaling.send_ack(ack).await {
        Ok(()) => debug!("Acknowledged {} '{}' from {}", message.action, message.id, message.from),
        Err(e) => warn!("Failed to acknowledge {} '{}': {}", message.action, message.id, e),
    }
}
