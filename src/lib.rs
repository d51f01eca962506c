//! Finds the first reachable, healthy endpoint among many candidates by
//! probing all of them at once and keeping whichever passes first.

pub mod candidate;
pub mod probe;
pub mod race;
pub mod source;

use std::sync::Arc;

pub use candidate::{Candidate, CandidateError, ProbeOutcome};
pub use probe::{HttpProbe, Probe, ProbeConfig, ProbeRoute};
pub use race::{race, AllFailed};
pub use source::{
    default_row_pattern, extract_candidates, CandidateSource, FetchError, ProxyListSource,
    StaticSource, DEFAULT_ROW_PATTERN,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot get candidate list: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    AllFailed(#[from] AllFailed),
}

/// Fetches candidates from `source` and races them with `probe`.
///
/// A source that yields nothing is reported as [`Error::AllFailed`].
pub async fn find_first_reachable<S, P>(source: &S, probe: Arc<P>) -> Result<Candidate, Error>
where
    S: CandidateSource,
    P: Probe,
{
    let candidates = source.fetch_candidates().await?;
    Ok(race(candidates, probe).await?)
}
