use crate::classifier::Classifier;
use crate::error::ClassificationError;
use crate::machine::{DispatchGate, MergeOutcome, SessionStateMachine};
use crate::sample::{Sample, SnapshotProvider};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

/// What a single tick did on the dispatch side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDispatch {
    /// A sample was captured and handed to the classifier worker.
    Dispatched,
    /// The previous classification has not come back yet.
    SkippedBusy,
    /// The session no longer accepts samples.
    SkippedClosed,
    /// Nothing has been drawn yet and sampling waits for the first stroke.
    SkippedBlank,
    CaptureFailed,
    /// The classifier worker is gone; nothing can be classified.
    WorkerUnavailable,
}

/// Per-cycle counters; the only place absorbed failures surface besides the log.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    ticks: AtomicU64,
    dispatched: AtomicU64,
    skipped_busy: AtomicU64,
    skipped_closed: AtomicU64,
    skipped_blank: AtomicU64,
    capture_failures: AtomicU64,
    classification_failures: AtomicU64,
    merged: AtomicU64,
    discarded: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub dispatched: u64,
    pub skipped_busy: u64,
    pub skipped_closed: u64,
    pub skipped_blank: u64,
    pub capture_failures: u64,
    pub classification_failures: u64,
    pub merged: u64,
    pub discarded: u64,
}

impl SchedulerStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            skipped_busy: self.skipped_busy.load(Ordering::Relaxed),
            skipped_closed: self.skipped_closed.load(Ordering::Relaxed),
            skipped_blank: self.skipped_blank.load(Ordering::Relaxed),
            capture_failures: self.capture_failures.load(Ordering::Relaxed),
            classification_failures: self.classification_failures.load(Ordering::Relaxed),
            merged: self.merged.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn lock_machine(
    machine: &Mutex<SessionStateMachine>,
) -> MutexGuard<'_, SessionStateMachine> {
    machine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Samples the drawing surface on each tick and feeds the classifier worker.
///
/// At most one classification per session is outstanding at any time: the
/// dispatch slot is claimed on the state machine before capture and released
/// by the worker under the same lock that merges the result.
pub struct InferenceScheduler<P: SnapshotProvider> {
    provider: Arc<P>,
    machine: Arc<Mutex<SessionStateMachine>>,
    jobs: mpsc::Sender<Sample>,
    stats: Arc<SchedulerStats>,
    wait_for_ink: bool,
    inked: AtomicBool,
}

impl<P: SnapshotProvider> InferenceScheduler<P> {
    /// Spawns the classifier worker. It exits once the scheduler is dropped.
    pub fn new<C: Classifier>(
        provider: Arc<P>,
        classifier: Arc<C>,
        machine: Arc<Mutex<SessionStateMachine>>,
    ) -> Self {
        let (jobs, rx) = mpsc::channel();
        let stats = Arc::new(SchedulerStats::default());

        let worker_machine = Arc::clone(&machine);
        let worker_stats = Arc::clone(&stats);
        thread::spawn(move || run_worker(rx, classifier, worker_machine, worker_stats));

        Self {
            provider,
            machine,
            jobs,
            stats,
            wait_for_ink: false,
            inked: AtomicBool::new(false),
        }
    }

    /// Hold off classifying until the first sample with ink in it.
    pub fn wait_for_ink(mut self, enabled: bool) -> Self {
        self.wait_for_ink = enabled;
        self
    }

    pub fn on_tick(&self) -> TickDispatch {
        bump(&self.stats.ticks);

        match lock_machine(&self.machine).begin_dispatch() {
            DispatchGate::Open => {}
            DispatchGate::Busy => {
                tracing::debug!("classification in flight, skipping tick");
                bump(&self.stats.skipped_busy);
                return TickDispatch::SkippedBusy;
            }
            DispatchGate::Closed => {
                bump(&self.stats.skipped_closed);
                return TickDispatch::SkippedClosed;
            }
        }

        let sample = match self.provider.capture() {
            Ok(sample) => sample,
            Err(err) => {
                tracing::warn!(%err, "skipping cycle");
                bump(&self.stats.capture_failures);
                lock_machine(&self.machine).abort_dispatch();
                return TickDispatch::CaptureFailed;
            }
        };

        if self.wait_for_ink && !self.inked.load(Ordering::Relaxed) {
            if sample.is_blank() {
                bump(&self.stats.skipped_blank);
                lock_machine(&self.machine).abort_dispatch();
                return TickDispatch::SkippedBlank;
            }
            tracing::debug!("first stroke seen, sampling starts");
            self.inked.store(true, Ordering::Relaxed);
        }

        if self.jobs.send(sample).is_err() {
            tracing::error!("classifier worker has exited");
            lock_machine(&self.machine).abort_dispatch();
            return TickDispatch::WorkerUnavailable;
        }

        bump(&self.stats.dispatched);
        TickDispatch::Dispatched
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

fn run_worker<C: Classifier>(
    rx: Receiver<Sample>,
    classifier: Arc<C>,
    machine: Arc<Mutex<SessionStateMachine>>,
    stats: Arc<SchedulerStats>,
) {
    for sample in rx {
        let result = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(&sample)))
            .unwrap_or_else(|_| Err(ClassificationError::Model("classifier panicked".into())));

        let mut machine = lock_machine(&machine);
        match result {
            Ok(ranking) => match machine.complete_dispatch(ranking) {
                MergeOutcome::Applied { status, trend } => {
                    tracing::debug!(%status, %trend, "merged classification");
                    bump(&stats.merged);
                }
                MergeOutcome::Discarded => {
                    tracing::debug!("session already ended, discarding classification");
                    bump(&stats.discarded);
                }
            },
            Err(err) => {
                tracing::warn!(%err, "classification failed, skipping cycle");
                bump(&stats.classification_failures);
                machine.abort_dispatch();
            }
        }
    }
}
