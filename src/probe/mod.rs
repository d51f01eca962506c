
use std::time::Duration;

use futures::Future;
use reqwest::{Client, Method, Proxy, StatusCode};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::candidate::Candidate;

/// A single pass/fail health check of one candidate.
///
/// Implementations must return `false` promptly once `cancel` fires and must
/// not retry. Whatever they acquire is released when the returned future
/// completes or is dropped.
pub trait Probe: Send + Sync + 'static {
    fn check(
        &self,
        candidate: &Candidate,
        cancel: &CancellationToken,
    ) -> impl Future<Output = bool> + Send;
}

#[derive(Clone, Debug)]
pub enum ProbeRoute {
    /// Request `target` using the candidate as an HTTP proxy.
    Proxy { target: Url },
    /// Request the candidate address itself.
    Direct,
}

#[derive(Clone, Debug)]
pub struct ProbeConfig {
    pub route: ProbeRoute,
    pub method: Method,
    pub expected_status: StatusCode,
    pub timeout: Duration,
}

impl ProbeConfig {
    pub fn through_proxy(target: Url) -> Self {
        Self {
            route: ProbeRoute::Proxy { target },
            method: Method::HEAD,
            expected_status: StatusCode::OK,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn direct() -> Self {
        Self {
            route: ProbeRoute::Direct,
            method: Method::GET,
            expected_status: StatusCode::OK,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_expected_status(mut self, status: StatusCode) -> Self {
        self.expected_status = status;
        self
    }
}

/// Probe that issues one HTTP request per candidate with a client of its own.
pub struct HttpProbe {
    config: ProbeConfig,
}

impl HttpProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    fn client_for(&self, candidate: &Candidate) -> Result<Client, reqwest::Error> {
        let builder = Client::builder()
            .timeout(self.config.timeout)
            .trust_dns(true)
            .pool_max_idle_per_host(0);
        let builder = match &self.config.route {
            ProbeRoute::Proxy { .. } => builder.proxy(Proxy::all(candidate.as_str())?),
            ProbeRoute::Direct => builder.no_proxy(),
        };
        builder.build()
    }

    fn request_url<'a>(&'a self, candidate: &'a Candidate) -> &'a Url {
        match &self.config.route {
            ProbeRoute::Proxy { target } => target,
            ProbeRoute::Direct => candidate.url(),
        }
    }
}

impl Probe for HttpProbe {
    async fn check(&self, candidate: &Candidate, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        let client = match self.client_for(candidate) {
            Ok(client) => client,
            Err(err) => {
                debug!(candidate = %candidate, error = %err, "cannot build client");
                return false;
            }
        };
        let request = client
            .request(self.config.method.clone(), self.request_url(candidate).clone())
            .send();
        select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(candidate = %candidate, "probe cancelled");
                false
            }
            response = request => match response {
                Ok(response) => {
                    let status = response.status();
                    if status != self.config.expected_status {
                        debug!(candidate = %candidate, status = %status, "unexpected status");
                    }
                    status == self.config.expected_status
                }
                Err(err) => {
                    debug!(
                        candidate = %candidate,
                        timeout = err.is_timeout(),
                        error = %err,
                        "probe request failed"
                    );
                    false
                }
            }
        }
    }
}
