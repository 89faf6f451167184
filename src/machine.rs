use crate::clock::ClockHandle;
use crate::guess::{RankedGuess, DISPLAY_GUESSES};
use crate::session::{ProbabilityPoint, Session, SessionSnapshot, Status, Trend};

/// Whether the scheduler may hand a new sample to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchGate {
    Open,
    /// A classification for this session is still outstanding.
    Busy,
    /// The session is terminal, or its time ran out.
    Closed,
}

/// What happened to a classifier result handed to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied { status: Status, trend: Trend },
    /// The session already left `InProgress`; the result had no effect.
    Discarded,
}

/// Owns the `Session` and every transition on it.
///
/// All fields, including the in-flight flag, live behind the one mutex the
/// controller wraps this in, so ticks, merges and abandonment are serialized.
#[derive(Debug)]
pub struct SessionStateMachine {
    session: Session,
    latest: Option<RankedGuess>,
    history: Vec<ProbabilityPoint>,
    in_flight: bool,
    clock: Option<ClockHandle>,
}

impl SessionStateMachine {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            latest: None,
            history: Vec::new(),
            in_flight: false,
            clock: None,
        }
    }

    /// Stop this clock when the session reaches a terminal state.
    pub fn with_clock(mut self, clock: ClockHandle) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> Status {
        self.session.status
    }

    pub fn is_closed(&self) -> bool {
        self.session.status.is_terminal()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn latest(&self) -> Option<&RankedGuess> {
        self.latest.as_ref()
    }

    pub fn history(&self) -> &[ProbabilityPoint] {
        &self.history
    }

    /// Claims the single dispatch slot if it is free.
    pub fn begin_dispatch(&mut self) -> DispatchGate {
        if self.is_closed() || self.session.remaining_seconds == 0 {
            return DispatchGate::Closed;
        }
        if self.in_flight {
            return DispatchGate::Busy;
        }
        self.in_flight = true;
        DispatchGate::Open
    }

    /// Releases the dispatch slot after a cycle produced nothing to merge.
    pub fn abort_dispatch(&mut self) {
        self.in_flight = false;
    }

    /// Releases the dispatch slot and merges the ranking it produced.
    pub fn complete_dispatch(&mut self, ranking: RankedGuess) -> MergeOutcome {
        self.in_flight = false;
        self.merge(ranking)
    }

    /// Applies a ranking: trend, history and the win check.
    pub fn merge(&mut self, ranking: RankedGuess) -> MergeOutcome {
        if self.is_closed() {
            return MergeOutcome::Discarded;
        }

        let target = self.session.target_word.clone();
        let probability = ranking.probability_of(&target);
        let trend = Trend::between(self.session.last_target_probability, probability);
        self.session.trend = trend;
        self.session.last_target_probability = probability;
        self.history.push(ProbabilityPoint::new(
            self.session.elapsed_seconds() as f64,
            probability,
        ));

        let won = ranking
            .find_within(&target, self.session.top_k)
            .is_some_and(|g| g.probability >= self.session.confidence_threshold);
        self.latest = Some(ranking);

        if won {
            self.transition(Status::Won);
        }

        MergeOutcome::Applied {
            status: self.session.status,
            trend,
        }
    }

    /// One clock tick. Ignored once terminal.
    ///
    /// Reaching zero times the session out on the spot, even with a
    /// classification outstanding; that result is discarded when it lands.
    pub fn on_tick(&mut self) -> Status {
        if self.is_closed() {
            return self.session.status;
        }

        self.session.remaining_seconds = self.session.remaining_seconds.saturating_sub(1);
        if self.session.remaining_seconds == 0 {
            if self.in_flight {
                tracing::debug!("time is up with a classification still outstanding");
            }
            self.transition(Status::TimedOut);
        }
        self.session.status
    }

    /// The clock ran out on its own. Times the session out if nothing ended it yet.
    pub fn expire(&mut self) -> Status {
        if !self.is_closed() {
            self.session.remaining_seconds = 0;
            self.transition(Status::TimedOut);
        }
        self.session.status
    }

    /// Player gave up. Returns false if the session had already ended.
    pub fn abandon(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.transition(Status::Lost);
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = &self.session;
        SessionSnapshot {
            target_word: session.target_word.clone(),
            status: session.status,
            trend: session.trend,
            remaining_seconds: session.remaining_seconds,
            total_seconds: session.total_seconds,
            top_k: session.top_k,
            confidence_threshold: session.confidence_threshold,
            last_target_probability: session.last_target_probability,
            target_rank: self
                .latest
                .as_ref()
                .and_then(|r| r.position(&session.target_word)),
            top_guesses: self
                .latest
                .as_ref()
                .map(|r| r.top(DISPLAY_GUESSES).to_vec())
                .unwrap_or_default(),
            history: self.history.clone(),
            classification_in_flight: self.in_flight,
            started_at: session.started_at,
        }
    }

    fn transition(&mut self, status: Status) {
        self.session.status = status;
        if let Some(clock) = &self.clock {
            clock.stop();
        }
        tracing::info!(
            target_word = %self.session.target_word,
            %status,
            remaining_seconds = self.session.remaining_seconds,
            "session ended"
        );
    }
}
