mod state;

use std::sync::Arc;

use tokio::{select, sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    candidate::{Candidate, ProbeOutcome},
    probe::Probe,
};
use state::{RaceState, Verdict};

/// Every probe failed, or there was nothing to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no candidate was reachable")]
pub struct AllFailed;

async fn run_probe<P: Probe>(
    probe: Arc<P>,
    candidate: Candidate,
    cancel: CancellationToken,
    outcome_sender: mpsc::Sender<ProbeOutcome>,
) {
    let passed = select! {
        biased;
        _ = cancel.cancelled() => false,
        passed = probe.check(&candidate, &cancel) => passed,
    };
    // the channel holds one slot per probe, so this never waits on the receiver
    let _ = outcome_sender.send(ProbeOutcome { candidate, passed }).await;
}

async fn drain(probes: &mut JoinSet<()>) {
    while let Some(joined) = probes.join_next().await {
        if let Err(err) = joined {
            if err.is_panic() {
                warn!(error = %err, "probe task panicked");
            }
        }
    }
}

/// Probes every candidate concurrently and returns the first one that passes.
///
/// Once a winner is known the remaining probes are cancelled, and this only
/// returns after every probe task has finished, whichever way the race ends.
/// If several probes pass at about the same time, the first outcome received
/// wins. An empty list fails without probing anything.
///
/// Dropping the returned future aborts all probe tasks.
pub async fn race<P: Probe>(
    candidates: Vec<Candidate>,
    probe: Arc<P>,
) -> Result<Candidate, AllFailed> {
    let launched = candidates.len();
    if launched == 0 {
        debug!("no candidates to race");
        return Err(AllFailed);
    }
    let cancel = CancellationToken::new();
    let (outcome_sender, mut outcome_receiver) = mpsc::channel::<ProbeOutcome>(launched);
    let mut probes = JoinSet::new();
    for candidate in candidates {
        probes.spawn(run_probe(
            Arc::clone(&probe),
            candidate,
            cancel.clone(),
            outcome_sender.clone(),
        ));
    }
    drop(outcome_sender);

    let mut state = RaceState::new(launched);
    let verdict = loop {
        let verdict = match outcome_receiver.recv().await {
            Some(outcome) => {
                debug!(
                    candidate = %outcome.candidate,
                    passed = outcome.passed,
                    "probe finished"
                );
                state.record(outcome)
            }
            None => state.close(),
        };
        if !matches!(verdict, Verdict::Pending) {
            break verdict;
        }
    };

    if matches!(verdict, Verdict::Won(_)) && state.cancel() {
        cancel.cancel();
    }
    let unfinished = state.pending();
    drain(&mut probes).await;

    match verdict {
        Verdict::Won(winner) => {
            info!(winner = %winner, launched, unfinished, "race won");
            Ok(winner)
        }
        Verdict::Exhausted | Verdict::Pending => {
            info!(launched, "all candidates failed");
            Err(AllFailed)
        }
    }
}
