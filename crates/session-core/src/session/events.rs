//! The per-session event queue
//!
//! Inbound signaling and connectivity completion both arrive through
//! callbacks on foreign tasks. They are turned into tagged events on one
//! queue consumed by the session's control task, which makes every state
//! transition of a session run one at a time.

use tokio::sync::mpsc;
use tracing::trace;

use crate::adapters::{ConnectivityState, MessageListener, TerminalListener};
use crate::jingle::JingleMessage;

/// Something the control task must react to
#[derive(Debug)]
pub(crate) enum SessionEvent {
    /// A Jingle message arrived on the signaling channel
    Signaling(JingleMessage),
    /// The connectivity engine reached a terminal state
    Connectivity(ConnectivityState),
}

/// Producer side of a session's event queue
#[derive(Debug, Clone)]
pub(crate) struct EventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Callback to register with the signaling channel
    pub(crate) fn message_listener(&self) -> MessageListener {
        let tx = self.tx.clone();
        std::sync::Arc::new(move |message: JingleMessage| {
            if tx.send(SessionEvent::Signaling(message)).is_err() {
                trace!("Session gone, dropping inbound Jingle message");
            }
        })
    }

    /// Callback to register with the connectivity session
    pub(crate) fn terminal_listener(&self) -> TerminalListener {
        let tx = self.tx.clone();
        Box::new(move |state: ConnectivityState| {
            if tx.send(SessionEvent::Connectivity(state)).is_err() {
                trace!("Session gone, dropping connectivity state {}", state);
            }
        })
    }
}
