//! Tests for the WebSocket session manager: first-frame liveness,
//! reconnection, heartbeat teardown, and disconnect semantics, all against
//! the scripted mock connector.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lanyard_core::ws::*;
use lanyard_core::{Endpoint, SessionError};

#[derive(Debug, Clone, PartialEq)]
enum Observed {
    Connect,
    Disconnect(Option<u16>, Option<String>),
    Reconnected,
    Text(String),
    Binary(Vec<u8>),
    Error(String),
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<Observed> {
        self.events.lock().unwrap().clone()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_connect(&self) {
        self.events.lock().unwrap().push(Observed::Connect);
    }
    fn on_disconnect(&self, code: Option<u16>, reason: Option<&str>) {
        self.events
            .lock()
            .unwrap()
            .push(Observed::Disconnect(code, reason.map(str::to_string)));
    }
    fn on_reconnected(&self) {
        self.events.lock().unwrap().push(Observed::Reconnected);
    }
    fn on_text_message(&self, text: &str) {
        self.events.lock().unwrap().push(Observed::Text(text.to_string()));
    }
    fn on_binary_message(&self, data: &[u8]) {
        self.events.lock().unwrap().push(Observed::Binary(data.to_vec()));
    }
    fn on_error(&self, error: &SessionError) {
        self.events.lock().unwrap().push(Observed::Error(error.to_string()));
    }
}

fn endpoint() -> Endpoint {
    Endpoint::new("wss://relay.test", "/ws")
}

fn manager(
    connector: &Arc<MockSocketConnector>,
    observer: &Arc<RecordingObserver>,
    config: SessionConfig,
) -> WebSocketManager {
    WebSocketManager::new(
        connector.clone() as Arc<dyn SocketConnector>,
        observer.clone() as Arc<dyn SessionObserver>,
        config,
    )
}

fn no_heartbeat() -> SessionConfig {
    SessionConfig {
        heartbeat_interval: Duration::ZERO,
        ..SessionConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_connected_only_after_first_frame() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames(vec![Frame::Text("hello".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.connect(endpoint()).await.unwrap();
    // Socket handshake alone does not confirm liveness.
    assert!(!session.is_connected());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(session.is_connected());
    assert_eq!(
        observer.events(),
        vec![Observed::Connect, Observed::Text("hello".into())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_frames_dispatch_in_arrival_order() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames(vec![
        Frame::Text("one".into()),
        Frame::Binary(vec![2]),
        Frame::Text("three".into()),
    ]));
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
        observer.events(),
        vec![
            Observed::Connect,
            Observed::Text("one".into()),
            Observed::Binary(vec![2]),
            Observed::Text("three".into()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_receive_failure_reconnects_after_backoff() {
    let connector = Arc::new(MockSocketConnector::new());
    // First connection: one frame, then the server drops it.
    connector.queue_script(MockScript::frames_then_drop(vec![Frame::Text("first".into())]));
    // Second connection delivers a frame and stays up.
    connector.queue_script(MockScript::frames(vec![Frame::Text("again".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.connect(endpoint()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!session.is_connected());
    assert!(session.is_reconnecting());
    assert_eq!(connector.connect_count(), 1);

    // Fixed 2s backoff, then one reconnect attempt reusing the endpoint.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(connector.connect_count(), 2);
    assert!(session.is_connected());
    assert!(!session.is_reconnecting());

    let events = observer.events();
    assert_eq!(events[0], Observed::Connect);
    assert_eq!(events[1], Observed::Text("first".into()));
    // The failure reaches observers before any reconnect succeeds.
    assert!(matches!(events[2], Observed::Error(_)));
    assert_eq!(events[3], Observed::Connect);
    assert_eq!(events[4], Observed::Reconnected);
    assert_eq!(events[5], Observed::Text("again".into()));
}

#[tokio::test(start_paused = true)]
async fn test_no_reconnect_when_auto_reconnect_disabled() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames_then_drop(vec![Frame::Text("only".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        auto_reconnect: false,
        ..no_heartbeat()
    };
    let session = manager(&connector, &observer, config);

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(connector.connect_count(), 1);
    assert!(!session.is_connected());

    let events = observer.events();
    assert!(matches!(events[2], Observed::Error(_)));
    assert!(matches!(events[3], Observed::Disconnect(_, _)));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_sends_pings_on_interval() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames(vec![Frame::Text("hi".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        heartbeat_interval: Duration::from_secs(1),
        ..SessionConfig::default()
    };
    let session = manager(&connector, &observer, config);

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let pings = connector
        .sent_frames(0)
        .iter()
        .filter(|frame| **frame == Frame::Ping)
        .count();
    assert_eq!(pings, 3);
}

#[tokio::test(start_paused = true)]
async fn test_zero_heartbeat_interval_disables_pings() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames(vec![Frame::Text("hi".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert!(connector.sent_frames(0).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reconnecting_tears_down_prior_heartbeat() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames(vec![Frame::Text("a".into())]));
    connector.queue_script(MockScript::frames(vec![Frame::Text("b".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        heartbeat_interval: Duration::from_secs(1),
        ..SessionConfig::default()
    };
    let session = manager(&connector, &observer, config);

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    let pings_before = connector
        .sent_frames(0)
        .iter()
        .filter(|frame| **frame == Frame::Ping)
        .count();
    assert!(pings_before >= 2);

    // Second connect on a live session: the prior timer and socket go first.
    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let pings_after = connector
        .sent_frames(0)
        .iter()
        .filter(|frame| **frame == Frame::Ping)
        .count();
    assert_eq!(pings_before, pings_after, "old heartbeat kept ticking");
    assert!(connector
        .sent_frames(1)
        .iter()
        .any(|frame| *frame == Frame::Ping));
    assert_eq!(connector.connect_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_defaults_to_normal_closure() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames(vec![Frame::Text("hi".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.disconnect(None, None).await;

    assert!(!session.is_connected());
    let (code, _reason) = connector.close_frame(0).unwrap();
    assert_eq!(code, CLOSE_NORMAL);

    let events = observer.events();
    assert!(matches!(
        events.last(),
        Some(Observed::Disconnect(Some(1000), Some(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_carries_custom_code_and_reason() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames(vec![Frame::Text("hi".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.disconnect(Some(4001), Some("going away".into())).await;

    let (code, reason) = connector.close_frame(0).unwrap();
    assert_eq!(code, 4001);
    assert_eq!(reason, "going away");
    assert_eq!(
        observer.events().last(),
        Some(&Observed::Disconnect(Some(4001), Some("going away".into())))
    );
}

#[tokio::test(start_paused = true)]
async fn test_send_without_connection_is_a_no_op() {
    let connector = Arc::new(MockSocketConnector::new());
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.send_text("into the void");
    session.send_binary(vec![1, 2, 3]);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(observer.events().is_empty());
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_send_reaches_the_active_socket() {
    let connector = Arc::new(MockSocketConnector::new());
    connector.queue_script(MockScript::frames(vec![Frame::Text("hi".into())]));
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.send_text("ping me back");
    session.send_binary(vec![9, 9]);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let sent = connector.sent_frames(0);
    assert!(sent.contains(&Frame::Text("ping me back".into())));
    assert!(sent.contains(&Frame::Binary(vec![9, 9])));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_endpoint_url_fails_connect() {
    let connector = Arc::new(MockSocketConnector::new());
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    let result = session.connect(Endpoint::new("not a url", "/ws")).await;
    assert!(matches!(result, Err(SessionError::ConnectFailed(_))));
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_connect_failure_reports_error_and_retries() {
    let connector = Arc::new(MockSocketConnector::new());
    // No script queued: the first connect attempt fails outright. Queue the
    // recovery script for the retry.
    let observer = Arc::new(RecordingObserver::default());
    let session = manager(&connector, &observer, no_heartbeat());

    session.connect(endpoint()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(matches!(observer.events()[0], Observed::Error(_)));
    assert!(session.is_reconnecting());

    connector.queue_script(MockScript::frames(vec![Frame::Text("late".into())]));
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(session.is_connected());
    assert_eq!(connector.connect_count(), 2);
}
