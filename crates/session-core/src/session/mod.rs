//! Participant session: lifecycle state machine and its helpers

pub mod ack;
pub(crate) mod events;
pub mod handle;
pub mod lifecycle;
pub mod room;
pub mod state;
pub mod streams;

pub use ack::acknowledge;
pub use handle::{SessionHandle, SessionStatus};
pub use lifecycle::JingleSession;
pub use room::{JoinedRoom, RoomMembership};
pub use state::SessionState;
pub use streams::{MediaStreamHandle, SsrcGenerator, StreamState};
