use std::collections::HashMap;
use std::time::{Duration, Instant};

// state local to the tui: how key releases are detected, and the synthetic
// releases still pending when the terminal can't report real ones
#[derive(Clone, Debug)]
pub struct TuiState {
    pub release_reporting: bool, // terminal sends KeyEventKind::Release
    pub tap_release: Duration,
    pub pending_ups: HashMap<char, Instant>, // piano key -> synthetic release time
}

impl TuiState {
    pub fn new(release_reporting: bool, tap_release: Duration) -> Self {
        Self {
            release_reporting,
            tap_release,
            pending_ups: HashMap::new(),
        }
    }

    // each press (including auto-repeat) pushes the synthetic release back
    pub fn hold(&mut self, code: char, now: Instant) {
        self.pending_ups.insert(code, now + self.tap_release);
    }

    pub fn due_ups(&mut self, now: Instant) -> Vec<char> {
        let due: Vec<char> = self
            .pending_ups
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(c, _)| *c)
            .collect();
        for c in &due {
            self.pending_ups.remove(c);
        }
        due
    }

    pub fn next_up(&self) -> Option<Instant> {
        self.pending_ups.values().min().copied()
    }
}
