use crate::classifier::Classifier;
use crate::clock::{Clock, ClockEvent, FixedTicker, Ticker};
use crate::error::SessionError;
use crate::machine::SessionStateMachine;
use crate::sample::SnapshotProvider;
use crate::scheduler::{lock_machine, InferenceScheduler, StatsSnapshot};
use crate::session::{GameConfig, Session, SessionSnapshot};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

struct ActiveSession<P: SnapshotProvider> {
    machine: Arc<Mutex<SessionStateMachine>>,
    scheduler: InferenceScheduler<P>,
}

impl<P: SnapshotProvider> ActiveSession<P> {
    fn on_clock_event(&self, event: ClockEvent) {
        match event {
            ClockEvent::Tick { remaining } => {
                // dispatch before the decrement so a fast final-second result can still win
                let dispatch = self.scheduler.on_tick();
                let status = lock_machine(&self.machine).on_tick();
                tracing::debug!(remaining, ?dispatch, %status, "tick");
            }
            ClockEvent::Expired => {
                let status = lock_machine(&self.machine).expire();
                tracing::debug!(%status, "countdown expired");
            }
        }
    }
}

/// Composition root: one clock, one live session, one classifier worker per session.
pub struct SessionController<P: SnapshotProvider, C: Classifier, T: Ticker> {
    provider: Arc<P>,
    classifier: Arc<C>,
    clock: Clock<T>,
    wait_for_ink: bool,
    active: Mutex<Option<Arc<ActiveSession<P>>>>,
}

impl<P: SnapshotProvider, C: Classifier> SessionController<P, C, FixedTicker> {
    pub fn with_interval(provider: P, classifier: C, interval: Duration) -> Self {
        Self::new(provider, classifier, FixedTicker::new(interval))
    }
}

impl<P: SnapshotProvider, C: Classifier, T: Ticker> SessionController<P, C, T> {
    pub fn new(provider: P, classifier: C, ticker: T) -> Self {
        Self {
            provider: Arc::new(provider),
            classifier: Arc::new(classifier),
            clock: Clock::new(ticker),
            wait_for_ink: false,
            active: Mutex::new(None),
        }
    }

    /// Sessions only start classifying once something has been drawn.
    pub fn wait_for_ink(mut self, enabled: bool) -> Self {
        self.wait_for_ink = enabled;
        self
    }

    /// Begin a new game. Fails on invalid configuration or while a countdown runs.
    pub fn start(&self, target_word: &str, config: GameConfig) -> Result<(), SessionError> {
        let session = Session::new(target_word, &config)?;
        let target_word = session.target_word.clone();

        let mut active = self.lock_active();
        if self.clock.is_running() {
            tracing::warn!("start requested while a session is running");
            return Err(SessionError::AlreadyRunning);
        }

        let machine = Arc::new(Mutex::new(
            SessionStateMachine::new(session).with_clock(self.clock.handle()),
        ));
        let scheduler = InferenceScheduler::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.classifier),
            Arc::clone(&machine),
        )
        .wait_for_ink(self.wait_for_ink);
        let next = Arc::new(ActiveSession { machine, scheduler });

        let ticking = Arc::clone(&next);
        self.clock
            .start(config.total_seconds, move |event| ticking.on_clock_event(event))?;

        tracing::info!(
            %target_word,
            top_k = config.top_k,
            confidence_threshold = config.confidence_threshold,
            total_seconds = config.total_seconds,
            "session started"
        );
        *active = Some(next);
        Ok(())
    }

    /// Player quits: forces `Lost`. Returns false when there was nothing to end.
    pub fn abandon(&self) -> bool {
        match self.lock_active().as_ref() {
            Some(session) => lock_machine(&session.machine).abandon(),
            None => false,
        }
    }

    /// `None` until the first session starts.
    pub fn current_snapshot(&self) -> Option<SessionSnapshot> {
        self.lock_active()
            .as_ref()
            .map(|session| lock_machine(&session.machine).snapshot())
    }

    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.lock_active()
            .as_ref()
            .map(|session| session.scheduler.stats())
    }

    /// Whether a countdown is still ticking.
    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Blocks until the current session is terminal or `timeout` elapses.
    pub fn wait_for_terminal(&self, timeout: Duration) -> Option<SessionSnapshot> {
        let deadline = Instant::now() + timeout;
        loop {
            let snapshot = self.current_snapshot()?;
            if snapshot.is_terminal() {
                return Some(snapshot);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<Arc<ActiveSession<P>>>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<P: SnapshotProvider, C: Classifier, T: Ticker> Drop for SessionController<P, C, T> {
    fn drop(&mut self) {
        self.clock.stop();
    }
}
