//! Connector lifecycle against a scripted transport on a paused clock

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use pulse_core::{ApiEndpoints, CampaignId, MetricSample};
use pulse_stream::{
    ConnectionState, ConnectorSettings, PayloadStream, StreamConnector, StreamError,
    StreamTransport,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

type Payloads = UnboundedSender<Result<String, StreamError>>;

enum Script {
    Refuse,
    Accept(UnboundedReceiver<Result<String, StreamError>>),
}

/// Hands out one scripted outcome per subscribe call; unscripted calls are refused.
#[derive(Default)]
struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    subscriptions: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn accept(&self) -> Payloads {
        let (tx, rx) = unbounded_channel();
        self.scripts.lock().unwrap().push_back(Script::Accept(rx));
        tx
    }

    fn refuse(&self) {
        self.scripts.lock().unwrap().push_back(Script::Refuse);
    }

    fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    fn subscription_count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    async fn subscribe(&self, url: &str) -> pulse_stream::Result<PayloadStream> {
        self.subscriptions.lock().unwrap().push(url.to_string());
        let script = self.scripts.lock().unwrap().pop_front();

        match script {
            Some(Script::Accept(rx)) => Ok(UnboundedReceiverStream::new(rx).boxed()),
            Some(Script::Refuse) | None => Err(StreamError::Connect("connection refused".into())),
        }
    }
}

fn connector(transport: &Arc<ScriptedTransport>) -> StreamConnector {
    StreamConnector::new(
        ApiEndpoints::new("http://pulse.test"),
        transport.clone(),
        ConnectorSettings::default(),
    )
    .unwrap()
}

fn stream_url(id: &str) -> String {
    format!("http://pulse.test/campaigns/{}/insights/stream", id)
}

/// Let spawned tasks run without moving the paused clock.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

async fn advance_ms(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

fn base() -> DateTime<Utc> {
    "2024-01-01T00:00:00Z".parse().unwrap()
}

fn payload(offset_ms: i64, impressions: u64) -> Result<String, StreamError> {
    let timestamp = base() + chrono::Duration::milliseconds(offset_ms);
    Ok(format!(
        r#"{{"timestamp":"{}","impressions":{},"clicks":0,"spend":1.0,"conversions":0}}"#,
        timestamp.to_rfc3339(),
        impressions
    ))
}

#[tokio::test(start_paused = true)]
async fn error_then_reconnect_after_delay_then_message() {
    let transport = Arc::new(ScriptedTransport::default());
    let first = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    assert_eq!(connector.feed().connection_state(), ConnectionState::Connected);

    first.send(Err(StreamError::Transport("connection reset".into()))).unwrap();
    settle().await;
    assert_eq!(connector.feed().connection_state(), ConnectionState::Disconnected);
    assert_eq!(transport.subscription_count(), 1);

    let second = transport.accept();
    advance_ms(2900).await;
    assert_eq!(transport.subscription_count(), 1);

    advance_ms(200).await;
    assert_eq!(transport.subscriptions(), vec![stream_url("c1"), stream_url("c1")]);
    assert_eq!(connector.feed().connection_state(), ConnectionState::Connected);

    let message = r#"{"timestamp":"2024-01-01T00:00:00Z","impressions":10,"clicks":1,
        "spend":5.5,"conversions":0}"#;
    second.send(Ok(message.into())).unwrap();
    settle().await;

    let expected = MetricSample {
        timestamp: base(),
        impressions: 10,
        clicks: 1,
        conversions: 0,
        spend: 5.5,
    };
    assert_eq!(connector.feed().snapshot(), vec![expected.clone()]);
    assert_eq!(connector.feed().latest(), expected);

    let stats = connector.stats().snapshot();
    assert_eq!(stats.connection_attempts, 2);
    assert_eq!(stats.reconnects_scheduled, 1);
    assert_eq!(stats.samples_admitted, 1);
}

#[tokio::test(start_paused = true)]
async fn refused_dial_retries_every_delay() {
    let transport = Arc::new(ScriptedTransport::default());
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    assert_eq!(transport.subscription_count(), 1);
    assert_eq!(connector.feed().connection_state(), ConnectionState::Disconnected);

    advance_ms(3_100).await;
    assert_eq!(transport.subscription_count(), 2);
    advance_ms(3_100).await;
    assert_eq!(transport.subscription_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn close_cancels_pending_reconnect() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.refuse();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    assert_eq!(connector.feed().connection_state(), ConnectionState::Disconnected);

    let unused = transport.accept();
    connector.close();
    assert_eq!(connector.feed().connection_state(), ConnectionState::Idle);

    advance_ms(10_000).await;
    assert_eq!(transport.subscription_count(), 1);
    assert!(connector.feed().is_empty());
    assert_eq!(connector.feed().connection_state(), ConnectionState::Idle);
    assert!(!connector.is_open());
    drop(unused);
}

#[tokio::test(start_paused = true)]
async fn nothing_is_admitted_after_close() {
    let transport = Arc::new(ScriptedTransport::default());
    let payloads = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    payloads.send(payload(0, 1)).unwrap();
    settle().await;
    assert_eq!(connector.feed().len(), 1);

    connector.close();
    let _ = payloads.send(payload(1, 2));
    advance_ms(10_000).await;

    assert_eq!(connector.feed().len(), 1);
    assert_eq!(connector.feed().latest().impressions, 1);
    assert!(payloads.is_closed());
}

#[tokio::test(start_paused = true)]
async fn reopen_with_new_campaign_replaces_subscription() {
    let transport = Arc::new(ScriptedTransport::default());
    let old = transport.accept();
    let new = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    old.send(payload(0, 1)).unwrap();
    settle().await;
    assert_eq!(connector.feed().len(), 1);

    connector.open("c2");
    settle().await;

    assert_eq!(transport.subscriptions(), vec![stream_url("c1"), stream_url("c2")]);
    assert!(old.is_closed());
    assert!(!new.is_closed());
    assert!(connector.feed().is_empty());
    assert_eq!(connector.campaign_id(), Some(CampaignId::from("c2")));

    new.send(payload(5, 7)).unwrap();
    settle().await;
    assert_eq!(connector.feed().latest().impressions, 7);
}

#[tokio::test(start_paused = true)]
async fn reopen_cancels_old_pending_reconnect() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.refuse();
    let new = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    assert_eq!(connector.feed().connection_state(), ConnectionState::Disconnected);

    connector.open("c2");
    settle().await;
    advance_ms(10_000).await;

    assert_eq!(transport.subscriptions(), vec![stream_url("c1"), stream_url("c2")]);
    assert_eq!(connector.feed().connection_state(), ConnectionState::Connected);
    drop(new);
}

#[tokio::test(start_paused = true)]
async fn malformed_payload_keeps_stream_open() {
    let transport = Arc::new(ScriptedTransport::default());
    let payloads = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    payloads.send(Ok("not json".into())).unwrap();
    payloads.send(Ok(r#"{"impressions":1}"#.into())).unwrap();
    payloads.send(payload(0, 3)).unwrap();
    settle().await;

    assert_eq!(connector.feed().connection_state(), ConnectionState::Connected);
    assert_eq!(transport.subscription_count(), 1);
    assert_eq!(connector.feed().len(), 1);
    assert_eq!(connector.feed().latest().impressions, 3);
    assert_eq!(connector.stats().snapshot().payloads_dropped, 2);
}

#[tokio::test(start_paused = true)]
async fn empty_campaign_id_stays_idle() {
    let transport = Arc::new(ScriptedTransport::default());
    let connector = connector(&transport);

    connector.open("");
    advance_ms(10_000).await;

    assert_eq!(transport.subscription_count(), 0);
    assert!(!connector.is_open());
    assert_eq!(connector.feed().connection_state(), ConnectionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn empty_campaign_id_closes_active_subscription() {
    let transport = Arc::new(ScriptedTransport::default());
    let payloads = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    connector.open("");
    settle().await;

    assert!(payloads.is_closed());
    assert!(!connector.is_open());
    assert_eq!(connector.feed().connection_state(), ConnectionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn close_is_idempotent() {
    let transport = Arc::new(ScriptedTransport::default());
    let connector = connector(&transport);

    connector.close();
    connector.close();
    assert_eq!(connector.feed().connection_state(), ConnectionState::Idle);

    let _payloads = transport.accept();
    connector.open("c1");
    settle().await;
    connector.close();
    connector.close();
    assert_eq!(connector.feed().connection_state(), ConnectionState::Idle);
    assert!(!connector.is_open());
}

#[tokio::test(start_paused = true)]
async fn opening_same_campaign_twice_is_a_no_op() {
    let transport = Arc::new(ScriptedTransport::default());
    let payloads = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    payloads.send(payload(0, 1)).unwrap();
    settle().await;

    connector.open("c1");
    settle().await;

    assert_eq!(transport.subscription_count(), 1);
    assert!(!payloads.is_closed());
    assert_eq!(connector.feed().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_connector_stops_reconnecting() {
    let transport = Arc::new(ScriptedTransport::default());
    let connector = connector(&transport);
    let feed = connector.feed().clone();

    connector.open("c1");
    settle().await;
    assert_eq!(transport.subscription_count(), 1);

    drop(connector);
    advance_ms(10_000).await;

    assert_eq!(transport.subscription_count(), 1);
    assert_eq!(feed.connection_state(), ConnectionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn buffer_keeps_last_thirty_streamed_samples() {
    let transport = Arc::new(ScriptedTransport::default());
    let payloads = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    for n in 1..=31u64 {
        payloads.send(payload(n as i64, n)).unwrap();
    }
    settle().await;

    let snapshot = connector.feed().snapshot();
    assert_eq!(snapshot.len(), 30);
    assert_eq!(snapshot[0].impressions, 2);
    assert_eq!(snapshot[29].impressions, 31);
    assert_eq!(connector.feed().latest().impressions, 31);
}

#[tokio::test(start_paused = true)]
async fn reconnect_keeps_buffered_samples() {
    let transport = Arc::new(ScriptedTransport::default());
    let first = transport.accept();
    let second = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    first.send(payload(0, 1)).unwrap();
    drop(first);
    settle().await;
    assert_eq!(connector.feed().connection_state(), ConnectionState::Disconnected);

    advance_ms(3_100).await;
    second.send(payload(10, 2)).unwrap();
    settle().await;

    let impressions: Vec<u64> = connector.feed().snapshot().iter().map(|s| s.impressions).collect();
    assert_eq!(impressions, vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn server_end_of_stream_triggers_reconnect() {
    let transport = Arc::new(ScriptedTransport::default());
    let first = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    drop(first);
    settle().await;
    assert_eq!(connector.feed().connection_state(), ConnectionState::Disconnected);

    let _second = transport.accept();
    advance_ms(3_100).await;
    assert_eq!(transport.subscription_count(), 2);
    assert_eq!(connector.feed().connection_state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn connection_state_is_published() {
    let transport = Arc::new(ScriptedTransport::default());
    let _payloads = transport.accept();
    let connector = connector(&transport);
    let mut states = connector.feed().subscribe();

    connector.open("c1");
    settle().await;

    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), ConnectionState::Connected);

    connector.close();
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), ConnectionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn window_filters_against_supplied_now() {
    let transport = Arc::new(ScriptedTransport::default());
    let payloads = transport.accept();
    let connector = connector(&transport);

    connector.open("c1");
    settle().await;
    payloads.send(payload(0, 1)).unwrap();
    payloads.send(payload(2 * 3_600_000, 2)).unwrap();
    settle().await;

    let now = base() + chrono::Duration::milliseconds(2 * 3_600_000 + 1_000);
    let last_hour = connector.feed().window("1h", now);
    assert_eq!(last_hour.len(), 1);
    assert_eq!(last_hour[0].impressions, 2);

    assert_eq!(connector.feed().window("24h", now).len(), 2);
    assert_eq!(connector.feed().window("bogus", now).len(), 2);
}

#[test]
fn connector_requires_a_runtime() {
    let transport = Arc::new(ScriptedTransport::default());
    let result = StreamConnector::new(
        ApiEndpoints::new("http://pulse.test"),
        transport,
        ConnectorSettings::default(),
    );
    assert!(matches!(result, Err(StreamError::NoRuntime)));
}
