#[cfg(test)]
mod tests;

use std::collections::HashSet;

use futures::Future;
use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::candidate::{Candidate, CandidateError};

/// Matches one proxy-list table row, capturing `ip` and `port`.
pub const DEFAULT_ROW_PATTERN: &str =
    r"<td>(?P<ip>\d{1,3}(?:\.\d{1,3}){3})</td>\s*<td>(?P<port>\d{1,5})</td>";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("candidate list responded with status {0}")]
    Status(StatusCode),
    #[error("invalid candidate {input:?}: {source}")]
    InvalidCandidate {
        input: String,
        source: CandidateError,
    },
    #[error("pattern has no capture group named {0:?}")]
    MissingCaptureGroup(&'static str),
}

/// Produces the candidates to race.
pub trait CandidateSource {
    fn fetch_candidates(&self) -> impl Future<Output = Result<Vec<Candidate>, FetchError>> + Send;
}

pub fn default_row_pattern() -> Regex {
    Regex::new(DEFAULT_ROW_PATTERN).expect("default row pattern compiles")
}

/// Extracts `http://ip:port` candidates from every `pattern` match in `body`.
///
/// Matches that do not form a valid address are skipped, and so are repeats
/// of an address already seen. Order of first appearance is kept.
pub fn extract_candidates(body: &str, pattern: &Regex) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    pattern
        .captures_iter(body)
        .filter_map(|row| {
            let ip = row.name("ip")?.as_str();
            let port = row.name("port")?.as_str();
            match Candidate::parse(&format!("http://{}:{}", ip, port)) {
                Ok(candidate) => Some(candidate),
                Err(err) => {
                    debug!(ip, port, error = %err, "skipping malformed row");
                    None
                }
            }
        })
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}

/// Scrapes candidates from an HTML proxy list.
pub struct ProxyListSource {
    url: Url,
    pattern: Regex,
    client: Client,
}

impl ProxyListSource {
    pub fn new(url: Url, client: Client) -> Self {
        Self {
            url,
            pattern: default_row_pattern(),
            client,
        }
    }

    pub fn with_pattern(url: Url, pattern: Regex, client: Client) -> Result<Self, FetchError> {
        for group in ["ip", "port"] {
            if !pattern.capture_names().flatten().any(|name| name == group) {
                return Err(FetchError::MissingCaptureGroup(group));
            }
        }
        Ok(Self {
            url,
            pattern,
            client,
        })
    }
}

impl CandidateSource for ProxyListSource {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await?;
        let candidates = extract_candidates(&body, &self.pattern);
        debug!(url = %self.url, count = candidates.len(), "fetched candidate list");
        Ok(candidates)
    }
}

/// Candidates supplied up front, e.g. on the command line.
pub struct StaticSource {
    addresses: Vec<String>,
}

impl StaticSource {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

impl CandidateSource for StaticSource {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, FetchError> {
        self.addresses
            .iter()
            .map(|input| {
                Candidate::parse(input).map_err(|source| FetchError::InvalidCandidate {
                    input: input.clone(),
                    source,
                })
            })
            .collect()
    }
}
