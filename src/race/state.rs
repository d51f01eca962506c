use crate::candidate::{Candidate, ProbeOutcome};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    Pending,
    Won(Candidate),
    Exhausted,
}

/// Bookkeeping of one race. Only the coordinator mutates it.
#[derive(Debug)]
pub(crate) struct RaceState {
    pending: usize,
    winner: Option<Candidate>,
    cancelled: bool,
    exhausted: bool,
}

impl RaceState {
    pub(crate) fn new(launched: usize) -> Self {
        Self {
            pending: launched,
            winner: None,
            cancelled: false,
            exhausted: launched == 0,
        }
    }

    /// Accounts for one finished probe. The first pass latches the winner;
    /// passes after the winner or after exhaustion change nothing.
    pub(crate) fn record(&mut self, outcome: ProbeOutcome) -> Verdict {
        self.pending = self.pending.saturating_sub(1);
        if outcome.passed && self.winner.is_none() && !self.exhausted {
            self.winner = Some(outcome.candidate);
        }
        self.verdict()
    }

    /// Every sender is gone, so nothing else can report.
    pub(crate) fn close(&mut self) -> Verdict {
        self.pending = 0;
        self.verdict()
    }

    /// Returns true only the first time.
    pub(crate) fn cancel(&mut self) -> bool {
        !std::mem::replace(&mut self.cancelled, true)
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending
    }

    fn verdict(&mut self) -> Verdict {
        if let Some(winner) = &self.winner {
            return Verdict::Won(winner.clone());
        }
        if self.pending == 0 {
            self.exhausted = true;
        }
        if self.exhausted {
            Verdict::Exhausted
        } else {
            Verdict::Pending
        }
    }
}
