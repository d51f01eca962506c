#[cfg(test)]
mod tests;

use std::{fmt::Display, str::FromStr};

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum CandidateError {
    #[error("invalid url: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported scheme {0:?}, expected http or https")]
    Scheme(String),
    #[error("url has no host")]
    MissingHost,
}

/// An endpoint under evaluation, e.g. `http://203.0.113.7:8080`.
///
/// Two candidates are equal when their addresses are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Candidate(Url);

impl Candidate {
    pub fn parse(address: &str) -> Result<Self, CandidateError> {
        Url::parse(address)?.try_into()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<Url> for Candidate {
    type Error = CandidateError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(CandidateError::Scheme(other.to_string())),
        }
        if url.host().is_none() {
            return Err(CandidateError::MissingHost);
        }
        Ok(Self(url))
    }
}

impl FromStr for Candidate {
    type Err = CandidateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a single probe reported for its candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub candidate: Candidate,
    pub passed: bool,
}
