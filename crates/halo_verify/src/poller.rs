//! Background verification poller
//!
//! [`start_polling`] spawns one task on the current tokio runtime. The task
//! waits a full interval before the first check, then checks once per tick
//! until the account reports verified or the handle is cancelled. Ticks that
//! fall behind a slow check are delayed, never bunched.

use crate::source::{AccountId, StatusSource};
use crate::state::{poll_machine, PollEvent, PollState, VerificationState};
use halo_core::StateMachine;
use halo_platform::Disposable;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Default delay between status checks
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
}

impl PollerConfig {
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// The signed-in session the poller is attached to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub account: AccountId,
    pub verified: bool,
}

impl Session {
    pub fn new(account: impl Into<AccountId>, verified: bool) -> Self {
        Self {
            account: account.into(),
            verified,
        }
    }
}

struct PollShared {
    account: AccountId,
    machine: Mutex<StateMachine<PollState, PollEvent>>,
    state_tx: watch::Sender<PollState>,
    checks: AtomicUsize,
    verified: AtomicBool,
}

impl PollShared {
    fn new(account: AccountId) -> Self {
        let (state_tx, _) = watch::channel(PollState::Idle);
        Self {
            account,
            machine: Mutex::new(poll_machine()),
            state_tx,
            checks: AtomicUsize::new(0),
            verified: AtomicBool::new(false),
        }
    }

    /// Feed `event` to the machine and publish the new state.
    /// `None` when the current state does not accept the event.
    fn fire(&self, event: PollEvent) -> Option<PollState> {
        let mut machine = self.machine.lock();
        let next = machine.try_send(event)?;
        if matches!(event, PollEvent::Verified | PollEvent::AlreadyVerified) {
            self.verified.store(true, Ordering::SeqCst);
        }
        self.state_tx.send_replace(next);
        Some(next)
    }

    fn state(&self) -> PollState {
        *self.state_tx.borrow()
    }
}

/// Owner of a running poller. Dropping it cancels the poller.
#[must_use = "dropping a PollHandle cancels the poller"]
pub struct PollHandle {
    shared: Arc<PollShared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollHandle {
    /// Stop polling. Idempotent; an in-flight check is abandoned and its
    /// result ignored.
    pub fn cancel(&self) {
        if self.shared.fire(PollEvent::Cancel).is_some() {
            tracing::debug!(
                account = %self.shared.account,
                checks = self.check_count(),
                "verification polling cancelled"
            );
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    pub fn state(&self) -> PollState {
        self.shared.state()
    }

    pub fn account(&self) -> &AccountId {
        &self.shared.account
    }

    /// Status checks started so far
    pub fn check_count(&self) -> usize {
        self.shared.checks.load(Ordering::SeqCst)
    }

    pub fn verification(&self) -> VerificationState {
        VerificationState {
            pending: !self.shared.verified.load(Ordering::SeqCst),
        }
    }

    /// Transitions taken so far, oldest first
    pub fn transitions(&self) -> Vec<(PollState, PollEvent, PollState)> {
        self.shared.machine.lock().history().to_vec()
    }

    /// Resolve once the poller reaches `Verified` or `Stopped`
    pub async fn finished(&self) -> PollState {
        let mut rx = self.shared.state_tx.subscribe();
        let state = match rx.wait_for(|state| state.is_terminal()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        state
    }
}

impl Disposable for PollHandle {
    fn dispose(&self) {
        self.cancel();
    }

    fn is_disposed(&self) -> bool {
        self.state().is_terminal()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("account", &self.shared.account)
            .field("state", &self.state())
            .field("checks", &self.check_count())
            .finish()
    }
}

/// Start polling `source` for `account`.
///
/// `on_reload` runs exactly once, after the timer is released, when the
/// account is first reported verified. Must be called from within a tokio
/// runtime.
pub fn start_polling<F>(
    account: AccountId,
    config: PollerConfig,
    source: Arc<dyn StatusSource>,
    on_reload: F,
) -> PollHandle
where
    F: FnOnce() + Send + 'static,
{
    let shared = Arc::new(PollShared::new(account));
    shared.fire(PollEvent::Start);

    let interval = config.interval.max(Duration::from_millis(1));
    tracing::debug!(
        account = %shared.account,
        interval_ms = interval.as_millis() as u64,
        "verification polling started"
    );

    let task = tokio::spawn(run(shared.clone(), interval, source, on_reload));
    PollHandle {
        shared,
        task: Mutex::new(Some(task)),
    }
}

/// Start polling only if `session` is still unverified
pub fn start_for_session<F>(
    session: &Session,
    config: PollerConfig,
    source: Arc<dyn StatusSource>,
    on_reload: F,
) -> PollHandle
where
    F: FnOnce() + Send + 'static,
{
    if !session.verified {
        return start_polling(session.account.clone(), config, source, on_reload);
    }

    let shared = Arc::new(PollShared::new(session.account.clone()));
    shared.fire(PollEvent::AlreadyVerified);
    PollHandle {
        shared,
        task: Mutex::new(None),
    }
}

async fn run<F>(
    shared: Arc<PollShared>,
    interval: Duration,
    source: Arc<dyn StatusSource>,
    on_reload: F,
) where
    F: FnOnce() + Send + 'static,
{
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if shared.state() != PollState::Polling {
            return;
        }

        let attempt = shared.checks.fetch_add(1, Ordering::SeqCst) + 1;
        let event = match source.check(&shared.account).await {
            Ok(report) if report.is_verified => PollEvent::Verified,
            Ok(_) => PollEvent::NotVerified,
            Err(err) => {
                tracing::debug!(account = %shared.account, attempt, %err, "verification check failed");
                PollEvent::CheckFailed
            }
        };

        match shared.fire(event) {
            Some(PollState::Verified) => {
                drop(ticker);
                tracing::info!(account = %shared.account, attempt, "account verified");
                on_reload();
                return;
            }
            Some(_) => {}
            // cancelled while the check was in flight
            None => return,
        }
    }
}
