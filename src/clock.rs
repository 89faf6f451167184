use crate::error::SessionError;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Events delivered by a running clock, strictly in order, on the clock thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    /// One unit of time elapsed; carries the decremented remaining value.
    Tick { remaining: u32 },
    /// The countdown reached zero. Delivered once, right after the final tick,
    /// unless the clock was stopped before then.
    Expired,
}

/// Paces the clock thread.
pub trait Ticker: Clone + Send + 'static {
    /// Block until the next tick is due. Returns false when the source is exhausted.
    fn wait(&mut self) -> bool;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn wait(&mut self) -> bool {
        thread::sleep(self.interval);
        true
    }
}

/// Ticker driven by hand: every `()` received is one tick.
#[derive(Clone, Debug)]
pub struct ChannelTicker {
    rx: Arc<Mutex<Receiver<()>>>,
}

impl ChannelTicker {
    pub fn new(rx: Receiver<()>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

impl Ticker for ChannelTicker {
    fn wait(&mut self) -> bool {
        match self.rx.lock() {
            Ok(rx) => rx.recv().is_ok(),
            Err(_) => false,
        }
    }
}

#[derive(Debug, Default)]
struct ClockState {
    running: bool,
    // Bumped on every start so a thread left over from an earlier run exits on wake.
    generation: u64,
}

/// Single countdown timer producing one tick per ticker interval.
#[derive(Debug)]
pub struct Clock<T: Ticker> {
    ticker: T,
    state: Arc<Mutex<ClockState>>,
}

/// Stop-only handle to a clock, held by the session state machine.
#[derive(Debug, Clone)]
pub struct ClockHandle {
    state: Arc<Mutex<ClockState>>,
}

impl ClockHandle {
    /// Halts the countdown. No further ticks, and no expiry, are delivered.
    pub fn stop(&self) {
        stop(&self.state);
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }
}

impl<T: Ticker> Clock<T> {
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            state: Arc::new(Mutex::new(ClockState::default())),
        }
    }

    /// Begin counting down from `total_seconds`, delivering events to `on_event`.
    pub fn start<F>(&self, total_seconds: u32, mut on_event: F) -> Result<(), SessionError>
    where
        F: FnMut(ClockEvent) + Send + 'static,
    {
        let generation = {
            let mut state = lock(&self.state);
            if state.running {
                tracing::warn!("clock start requested while a countdown is running");
                return Err(SessionError::AlreadyRunning);
            }
            state.running = true;
            state.generation += 1;
            state.generation
        };

        let shared = Arc::clone(&self.state);
        let mut ticker = self.ticker.clone();

        thread::spawn(move || {
            let mut remaining = total_seconds;
            while remaining > 0 {
                if !ticker.wait() {
                    tracing::debug!(generation, "tick source exhausted");
                    let _ = finish(&shared, generation);
                    return;
                }
                if !is_live(&shared, generation) {
                    return;
                }
                remaining -= 1;
                on_event(ClockEvent::Tick { remaining });
            }
            if finish(&shared, generation) {
                on_event(ClockEvent::Expired);
            }
        });

        Ok(())
    }

    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn stop(&self) {
        stop(&self.state);
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }
}

fn stop(state: &Mutex<ClockState>) {
    let mut state = lock(state);
    if state.running {
        tracing::debug!(generation = state.generation, "clock stopped");
        state.running = false;
    }
}

fn lock(state: &Mutex<ClockState>) -> MutexGuard<'_, ClockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn is_live(state: &Mutex<ClockState>, generation: u64) -> bool {
    let state = lock(state);
    state.running && state.generation == generation
}

/// Marks the countdown idle; false when it was stopped or a newer run has taken over.
fn finish(state: &Mutex<ClockState>, generation: u64) -> bool {
    let mut state = lock(state);
    if !state.running || state.generation != generation {
        return false;
    }
    state.running = false;
    true
}
