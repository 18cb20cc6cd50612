//! Run outcome state machine

use serde::{Deserialize, Serialize};

/// How the current run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// Run in progress
    #[default]
    Playing,
    /// Player reached the goal
    Won,
    /// Player was tagged
    Lost,
}

impl Outcome {
    /// Check if the run is still in progress
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if the run has been decided
    pub fn is_decided(&self) -> bool {
        !self.is_playing()
    }
}

/// A request to end the run, raised by world props
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionSignal {
    Win,
    Lose,
}

/// Outcome change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionTransition {
    /// Previous outcome
    pub from: Outcome,
    /// New outcome
    pub to: Outcome,
    /// Run time when the change happened
    pub elapsed: f32,
}

/// One run of the game
///
/// Elapsed time only advances while playing. The first win or lose sticks
/// until the run is reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSession {
    outcome: Outcome,
    elapsed: f32,
    best_time: Option<f32>,
    runs: u32,
    #[serde(skip)]
    pending: Vec<SessionTransition>,
    #[serde(skip)]
    history: Vec<SessionTransition>,
}

impl GameSession {
    /// Create a session with a fresh run in progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Current outcome
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Seconds played in the current run
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Fastest winning time, if any run was won
    pub fn best_time(&self) -> Option<f32> {
        self.best_time
    }

    /// Number of finished runs
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Advance the run timer
    pub fn tick(&mut self, delta_time: f32) {
        if self.outcome.is_playing() {
            self.elapsed += delta_time.max(0.0);
        }
    }

    /// End the run as a win. Returns false if the run was already decided.
    pub fn win(&mut self) -> bool {
        if !self.decide(Outcome::Won) {
            return false;
        }
        if self.best_time.map_or(true, |best| self.elapsed < best) {
            log::info!("New best time: {:.2}s", self.elapsed);
            self.best_time = Some(self.elapsed);
        }
        true
    }

    /// End the run as a loss. Returns false if the run was already decided.
    pub fn lose(&mut self) -> bool {
        self.decide(Outcome::Lost)
    }

    /// Apply a signal raised by a world prop
    pub fn apply(&mut self, signal: SessionSignal) -> bool {
        match signal {
            SessionSignal::Win => self.win(),
            SessionSignal::Lose => self.lose(),
        }
    }

    /// Start a new run, keeping the best time
    pub fn reset_run(&mut self) {
        let from = self.outcome;
        self.outcome = Outcome::Playing;
        self.elapsed = 0.0;
        self.record(from, Outcome::Playing);
        log::info!("Run reset");
    }

    /// Drain outcome changes since the last call
    pub fn drain_transitions(&mut self) -> Vec<SessionTransition> {
        std::mem::take(&mut self.pending)
    }

    /// Every outcome change so far
    pub fn history(&self) -> &[SessionTransition] {
        &self.history
    }

    fn decide(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_decided() {
            return false;
        }
        let from = self.outcome;
        self.outcome = outcome;
        self.runs += 1;
        self.record(from, outcome);
        log::info!("Run ended: {:?} after {:.2}s", outcome, self.elapsed);
        true
    }

    fn record(&mut self, from: Outcome, to: Outcome) {
        let transition = SessionTransition {
            from,
            to,
            elapsed: self.elapsed,
        };
        self.history.push(transition);
        self.pending.push(transition);
    }
}
