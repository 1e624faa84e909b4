mod common;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::io;
use std::sync::Arc;
use tokio::time::timeout;

use common::*;
use hammer_session_core::adapters::JoinError;
use hammer_session_core::session::{JoinedRoom, RoomMembership};
use hammer_session_core::{SessionConfig, SessionError, SessionState};

fn conflicts(count: usize) -> Vec<Result<(), JoinError>> {
    (0..count).map(|_| Err(JoinError::NicknameConflict)).collect()
}

#[tokio::test]
async fn test_each_conflict_appends_one_marker() {
    let harness = Harness::spawn(
        MockSignaling::new().with_join_results(conflicts(3)),
        MockConnectivity::new(),
        MockMedia::supporting(&["opus"]),
    );
    timeout(WAIT, harness.handle.wait_for(SessionState::AwaitingOffer))
        .await
        .expect("timed out")
        .expect("joined");

    assert_eq!(
        harness.signaling.joins(),
        vec!["hammer-0", "hammer-0_", "hammer-0__", "hammer-0___"]
    );
    assert_eq!(harness.handle.nickname(), "hammer-0___");

    let presences = harness.signaling.presences();
    assert_eq!(presences.len(), 1);
    assert_eq!(presences[0].nick, "hammer-0___");
    assert_eq!(presences[0].to, "loadtest@conference.example.com/hammer-0___");
    assert_eq!(
        harness.signaling.count(&Sent::GroupMessage("Hello World!".to_string())),
        1
    );

    harness.handle.stop().await;
    assert_eq!(harness.signaling.count(&Sent::Leave), 1);
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock()).lines().map(str::to_string).collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_participant_span_carries_joined_nickname() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let harness = Harness::spawn(
        MockSignaling::new().with_join_results(conflicts(2)),
        MockConnectivity::new(),
        MockMedia::supporting(&["opus"]),
    );
    timeout(WAIT, harness.handle.wait_for(SessionState::AwaitingOffer))
        .await
        .expect("timed out")
        .expect("joined");
    harness.handle.stop().await;

    let tagged: Vec<String> = logs
        .lines()
        .into_iter()
        .filter(|line| line.contains("nick="))
        .collect();
    assert!(!tagged.is_empty(), "no log line carries the nickname");
    for line in &tagged {
        assert!(line.contains("nick=hammer-0__"), "stale nickname in: {}", line);
    }
}

#[tokio::test]
async fn test_join_gives_up_after_max_attempts() {
    let harness = Harness::spawn_with(
        MockSignaling::new().with_join_results(conflicts(10)),
        MockConnectivity::new(),
        MockMedia::supporting(&["opus"]),
        host(),
        SessionConfig::default().with_max_join_attempts(4),
    );
    timeout(WAIT, harness.handle.wait_for(SessionState::Terminated))
        .await
        .expect("timed out")
        .expect("terminated");

    let failure = harness.handle.failure().expect("failure reported");
    assert!(matches!(failure, SessionError::NicknameRetriesExhausted { attempts: 4 }));
    assert_eq!(harness.signaling.joins().len(), 4);
    assert_eq!(harness.signaling.count(&Sent::Disconnect), 1);
    assert_eq!(harness.signaling.count(&Sent::Leave), 0);
    assert!(harness.signaling.presences().is_empty());
}

#[tokio::test]
async fn test_fatal_join_error_is_not_retried() {
    let harness = Harness::spawn(
        MockSignaling::new().with_join_results(vec![Err(JoinError::Fatal("forbidden".into()))]),
        MockConnectivity::new(),
        MockMedia::supporting(&["opus"]),
    );
    timeout(WAIT, harness.handle.wait_for(SessionState::Terminated))
        .await
        .expect("timed out")
        .expect("terminated");

    assert!(matches!(
        harness.handle.failure(),
        Some(SessionError::RoomJoinFailure { ref reason }) if reason.contains("forbidden")
    ));
    assert_eq!(harness.signaling.joins(), vec!["hammer-0"]);
    assert_eq!(harness.handle.nickname(), "hammer-0");
}

#[tokio::test]
async fn test_membership_with_custom_marker() {
    let signaling = Arc::new(MockSignaling::new().with_join_results(conflicts(2)));
    let mut room = RoomMembership::new(signaling.clone(), host());

    let joined = room.join("bob", '~', 10).await.unwrap();
    assert_eq!(
        joined,
        JoinedRoom {
            nickname: "bob~~".to_string(),
            attempts: 3,
        }
    );
    assert!(room.is_joined());

    room.announce(None).await.unwrap();
    assert!(signaling
        .sent()
        .iter()
        .all(|s| !matches!(s, Sent::GroupMessage(_))));

    room.leave().await;
    room.leave().await;
    assert_eq!(signaling.count(&Sent::Leave), 1);
    assert!(!room.is_joined());
}

#[tokio::test]
async fn test_announce_requires_membership() {
    let signaling = Arc::new(MockSignaling::new());
    let room = RoomMembership::new(signaling.clone(), host());

    let err = room.announce(Some("hi")).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_state");
    assert!(signaling.sent().is_empty());
}
