use std::time::Duration;

use harness::acceptor::Acceptor;
use harness::client::Client;
use harness::{run_suite, HarnessConfig, HarnessError, Scenario, ScenarioRunner, Side};
use xconn::{ConnectionState, ErrorKind, Listener};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn run(scenario: Scenario) -> harness::Report {
    init();
    let runner = ScenarioRunner::start(HarnessConfig::default()).await.unwrap();
    runner.run(scenario).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closing_by_client() {
    let report = run(Scenario::CloseByClient).await;

    let read = report.get(Side::Acceptor, "read").unwrap();
    assert_eq!(read.actual.bytes, 0);
    assert_eq!(read.actual.error, Some(ErrorKind::EndOfStream));
    assert!(report.passed(), "{}", report);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closing_by_server() {
    let report = run(Scenario::CloseByServer).await;

    let first = report.get(Side::Client, "first write").unwrap();
    assert_eq!(first.actual.bytes, 5);
    assert_eq!(first.actual.error, None);

    let second = report.get(Side::Client, "second write").unwrap();
    assert_eq!(second.actual.bytes, 0);
    assert_eq!(second.actual.error, Some(ErrorKind::Reset));
    assert!(report.passed(), "{}", report);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closing_on_reading() {
    let report = run(Scenario::CloseWhileReading).await;

    let server = report.get(Side::Acceptor, "read").unwrap();
    assert_eq!(server.actual.bytes, 0);
    assert_eq!(server.actual.error, Some(ErrorKind::ClosedHandle));
    assert!(server
        .actual
        .message
        .as_deref()
        .unwrap_or_default()
        .contains("use of closed network connection"));

    let client = report.get(Side::Client, "read").unwrap();
    assert_eq!(client.actual.bytes, 0);
    assert_eq!(client.actual.error, Some(ErrorKind::EndOfStream));

    assert_ne!(server.actual.error, client.actual.error);
    assert!(report.passed(), "{}", report);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn writes_after_reset_keep_failing() {
    init();
    let listener = Listener::bind(HarnessConfig::default().bind_addr).await.unwrap();
    let target = listener.local_addr();
    let acceptor = Acceptor::new(listener).spawn_closer();

    let client = Client::connect(target).await.unwrap();
    acceptor.closed().await.unwrap();

    assert_eq!(client.write(b"hello").await.bytes, 5);
    for _ in 0..3 {
        let outcome = client.write(b"hello").await;
        assert_eq!(outcome.bytes, 0);
        assert_eq!(outcome.error, Some(ErrorKind::Reset));
    }
    assert_eq!(client.connection().state(), ConnectionState::Closed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn double_close_does_not_hang() {
    init();
    let listener = Listener::bind(HarnessConfig::default().bind_addr).await.unwrap();
    let target = listener.local_addr();
    let acceptor = Acceptor::new(listener).spawn_reader(100);

    let client = Client::connect(target).await.unwrap();
    assert_eq!(client.close().error, None);

    let again = tokio::time::timeout(Duration::from_secs(1), async { client.close() })
        .await
        .unwrap();
    assert_eq!(again.error, Some(ErrorKind::ClosedHandle));

    let read = acceptor.outcome().await.unwrap();
    assert_eq!(read.error, Some(ErrorKind::EndOfStream));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn longer_settle_delay_same_outcome() {
    init();
    let config = HarnessConfig::default().with_settle_delay(Duration::from_millis(300));
    let runner = ScenarioRunner::start(config).await.unwrap();
    let report = runner.run(Scenario::CloseWhileReading).await.unwrap();
    assert!(report.passed(), "{}", report);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn suite_runs_every_scenario() {
    init();
    let reports = run_suite(&HarnessConfig::default(), &Scenario::ALL).await.unwrap();
    let ran: Vec<_> = reports.iter().map(|r| r.scenario).collect();
    assert_eq!(ran, Scenario::ALL.to_vec());
    assert!(reports.iter().all(|r| r.passed()));
}

#[tokio::test]
async fn bind_failure_aborts() {
    init();
    let taken = Listener::bind(HarnessConfig::default().bind_addr).await.unwrap();
    let config = HarnessConfig::default().with_bind_addr(taken.local_addr());

    let err = run_suite(&config, &Scenario::ALL).await.unwrap_err();
    assert!(err.is_setup());
    assert!(matches!(err, HarnessError::Aborted(ref e) if e.kind() == ErrorKind::Bind));
}
