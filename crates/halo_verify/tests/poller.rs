use async_trait::async_trait;
use halo_platform::Disposable;
use halo_verify::{
    start_for_session, start_polling, AccountId, PollEvent, PollHandle, PollState, PollerConfig,
    Session, StatusError, StatusReport, StatusSource,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Replays scripted results, then keeps answering "not verified"
struct ScriptedSource {
    script: Mutex<VecDeque<Result<bool, StatusError>>>,
    latency: Duration,
}

impl ScriptedSource {
    fn new(script: impl IntoIterator<Item = Result<bool, StatusError>>) -> Arc<Self> {
        Self::slow(script, Duration::ZERO)
    }

    fn slow(
        script: impl IntoIterator<Item = Result<bool, StatusError>>,
        latency: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            latency,
        })
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn check(&self, _account: &AccountId) -> Result<StatusReport, StatusError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().pop_front().unwrap_or(Ok(false));
        next.map(|is_verified| StatusReport { is_verified })
    }
}

fn reload_counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let reloads = Arc::new(AtomicUsize::new(0));
    let counter = reloads.clone();
    (reloads, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

fn poll(source: Arc<ScriptedSource>, reload: impl FnOnce() + Send + 'static) -> PollHandle {
    start_polling(
        AccountId::new("acct-1"),
        PollerConfig::with_interval_ms(5000),
        source,
        reload,
    )
}

#[tokio::test(start_paused = true)]
async fn verifies_on_fourth_tick_and_stops() {
    let source = ScriptedSource::new([Ok(false), Ok(false), Ok(false), Ok(true)]);
    let (reloads, reload) = reload_counter();
    let handle = poll(source, reload);

    assert_eq!(handle.finished().await, PollState::Verified);
    assert_eq!(handle.check_count(), 4);
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
    assert!(!handle.verification().pending);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.check_count(), 4);
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn first_check_waits_one_interval() {
    let source = ScriptedSource::new([Ok(false)]);
    let (_reloads, reload) = reload_counter();
    let handle = poll(source, reload);

    assert_eq!(handle.state(), PollState::Polling);
    tokio::time::sleep(Duration::from_millis(4999)).await;
    assert_eq!(handle.check_count(), 0);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(handle.check_count(), 1);
    assert!(handle.verification().pending);
}

#[tokio::test(start_paused = true)]
async fn transport_failures_keep_polling() {
    let source = ScriptedSource::new([
        Err(StatusError::Transport("connection reset".into())),
        Err(StatusError::Status(503)),
        Err(StatusError::Decode("expected value".into())),
        Ok(true),
    ]);
    let (reloads, reload) = reload_counter();
    let handle = poll(source, reload);

    assert_eq!(handle.finished().await, PollState::Verified);
    assert_eq!(handle.check_count(), 4);
    assert_eq!(reloads.load(Ordering::SeqCst), 1);

    let events: Vec<PollEvent> = handle.transitions().iter().map(|(_, e, _)| *e).collect();
    assert_eq!(
        events,
        vec![
            PollEvent::Start,
            PollEvent::CheckFailed,
            PollEvent::CheckFailed,
            PollEvent::CheckFailed,
            PollEvent::Verified,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent_and_final() {
    let source = ScriptedSource::new([Ok(false), Ok(true)]);
    let (reloads, reload) = reload_counter();
    let handle = poll(source, reload);

    tokio::time::sleep(Duration::from_millis(7500)).await;
    assert_eq!(handle.check_count(), 1);

    handle.cancel();
    handle.cancel();
    assert_eq!(handle.state(), PollState::Stopped);
    assert!(handle.is_disposed());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.check_count(), 1);
    assert_eq!(reloads.load(Ordering::SeqCst), 0);
    assert_eq!(handle.finished().await, PollState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn cancel_abandons_in_flight_check() {
    let source = ScriptedSource::slow([Ok(true)], Duration::from_secs(10));
    let (reloads, reload) = reload_counter();
    let handle = poll(source, reload);

    // first check starts at 5s and would answer at 15s
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(handle.check_count(), 1);
    handle.dispose();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(handle.state(), PollState::Stopped);
    assert_eq!(reloads.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_polling() {
    let source = ScriptedSource::new([Ok(false)]);
    let (reloads, reload) = reload_counter();
    let handle = poll(source.clone(), reload);
    drop(handle);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(reloads.load(Ordering::SeqCst), 0);
    assert_eq!(Arc::strong_count(&source), 1);
}

#[tokio::test(start_paused = true)]
async fn verified_session_never_polls() {
    let source = ScriptedSource::new([Ok(true)]);
    let (reloads, reload) = reload_counter();
    let handle = start_for_session(
        &Session::new("acct-2", true),
        PollerConfig::default(),
        source,
        reload,
    );

    assert_eq!(handle.state(), PollState::Stopped);
    assert!(!handle.verification().pending);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.check_count(), 0);
    assert_eq!(reloads.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn unverified_session_polls() {
    let source = ScriptedSource::new([Ok(true)]);
    let (reloads, reload) = reload_counter();
    let handle = start_for_session(
        &Session::new("acct-3", false),
        PollerConfig::default(),
        source,
        reload,
    );

    assert_eq!(handle.finished().await, PollState::Verified);
    assert_eq!(handle.check_count(), 1);
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
}
