//! Remote sanctions screening.
//!
//! A lookup is a single `GET <base_url><address>` answered with
//! `{"addressAllowed": <bool>}`. The endpoint is treated as unreliable: a
//! request that produces no response at all is retried according to the
//! configured [`RetryPolicy`]. Anything that does produce a response, whatever
//! its status code, ends the retry loop and is decoded as-is.

use std::future::Future;

use serde::Deserialize;
use tokio::time::sleep;

use crate::address::Address;
use crate::config::RetryPolicy;
use crate::error::{BoxError, Result, ScreeningError};
use crate::metrics::{inc_screening_attempts, inc_screening_lookups, inc_screening_transport_failures};

/// The HTTP seam of the screener. `get` fails only when no response was
/// obtained; reading the body is a separate step so that body failures are
/// not mistaken for transport failures.
pub trait Transport: Send + Sync {
    type Response: Send;

    fn get(&self, url: &str) -> impl Future<Output = std::result::Result<Self::Response, BoxError>> + Send;

    fn read_body(
        &self,
        response: Self::Response,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, BoxError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest` client with its default
/// timeouts.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    type Response = reqwest::Response;

    async fn get(&self, url: &str) -> std::result::Result<reqwest::Response, BoxError> {
        Ok(self.client.get(url).send().await?)
    }

    async fn read_body(&self, response: reqwest::Response) -> std::result::Result<Vec<u8>, BoxError> {
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(target: "screening", "screening endpoint answered {status}, decoding body anyway");
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// A missing or `null` verdict reads as `false`; unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
struct ScreeningResponse {
    #[serde(
        default,
        rename = "addressAllowed",
        alias = "AddressAllowed",
        alias = "addressallowed",
        alias = "ADDRESSALLOWED"
    )]
    address_allowed: Option<bool>,
}

/// Client for a remote screening endpoint.
#[derive(Debug, Clone)]
pub struct RemoteScreener<T = HttpTransport> {
    base_url: String,
    transport: T,
    policy: RetryPolicy,
}

impl RemoteScreener<HttpTransport> {
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self::with_transport(base_url, HttpTransport::new(), policy)
    }
}

impl<T: Transport> RemoteScreener<T> {
    pub fn with_transport(base_url: impl Into<String>, transport: T, policy: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            policy,
        }
    }

    /// The base URL with the checksummed address appended verbatim. Callers
    /// supply any trailing separator as part of the base.
    pub fn target_url(&self, addr: &Address) -> String {
        format!("{}{}", self.base_url, addr)
    }

    /// Ask the endpoint whether `addr` may transact.
    pub async fn is_allowed(&self, addr: &Address) -> Result<bool> {
        let url = self.target_url(addr);
        tracing::info!(target: "screening", "Validating address screening status addr={addr} url={url}");
        inc_screening_lookups();

        let response = self.get_or_retry(&url).await?;
        let body = self
            .transport
            .read_body(response)
            .await
            .map_err(ScreeningError::ReadBody)?;
        let verdict: Option<ScreeningResponse> =
            serde_json::from_slice(&body).map_err(ScreeningError::DecodeVerdict)?;

        Ok(verdict.and_then(|v| v.address_allowed).unwrap_or(false))
    }

    async fn get_or_retry(&self, url: &str) -> Result<T::Response> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            inc_screening_attempts();

            match self.transport.get(url).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    inc_screening_transport_failures();
                    tracing::warn!(
                        target: "screening",
                        "attempt {attempt}/{max_attempts} to {url} failed: {e}"
                    );
                    if attempt >= max_attempts {
                        return Err(ScreeningError::Transport {
                            attempts: attempt,
                            source: e,
                        });
                    }
                    sleep(self.policy.delay).await;
                }
            }
        }
    }
}
