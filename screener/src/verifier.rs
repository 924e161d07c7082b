use crate::address::Address;
use crate::config::VerifierConfig;
use crate::denylist::Denylist;
use crate::error::Result;
use crate::metrics::inc_verdict;
use crate::screening::{HttpTransport, RemoteScreener, Transport};

/// Decides whether an address may transact.
///
/// The local denylist always wins and is consulted without touching the
/// network. Addresses it does not name are forwarded to the remote screener
/// when one is configured, and allowed otherwise.
#[derive(Debug)]
pub struct AddressVerifier<T = HttpTransport> {
    denylist: Denylist,
    remote: Option<RemoteScreener<T>>,
}

impl AddressVerifier<HttpTransport> {
    /// Load the denylist and set up the remote screener described by
    /// `config`. Fails only if a configured denylist cannot be read or parsed.
    pub fn new(config: &VerifierConfig) -> Result<Self> {
        let denylist = Denylist::load(&config.denylist_path)?;
        let remote = (!config.screening_url.is_empty())
            .then(|| RemoteScreener::new(config.screening_url.clone(), config.retry));
        Ok(Self::with_parts(denylist, remote))
    }
}

impl<T: Transport> AddressVerifier<T> {
    pub fn with_parts(denylist: Denylist, remote: Option<RemoteScreener<T>>) -> Self {
        Self { denylist, remote }
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    pub fn remote(&self) -> Option<&RemoteScreener<T>> {
        self.remote.as_ref()
    }

    /// `Ok(false)` for denylisted addresses, the remote verdict when a
    /// screening endpoint is configured, `Ok(true)` otherwise.
    ///
    /// An error means the decision is unknown; it must not be read as
    /// permission.
    pub async fn is_allowed(&self, addr: &Address) -> Result<bool> {
        if self.denylist.contains(addr) {
            tracing::debug!(target: "verifier", "{addr} is denylisted");
            inc_verdict("denied", "denylist");
            return Ok(false);
        }

        let Some(remote) = &self.remote else {
            inc_verdict("allowed", "default");
            return Ok(true);
        };

        match remote.is_allowed(addr).await {
            Ok(allowed) => {
                inc_verdict(if allowed { "allowed" } else { "denied" }, "remote");
                Ok(allowed)
            }
            Err(e) => {
                tracing::warn!(target: "verifier", "screening {addr} failed: {e}");
                inc_verdict("error", "remote");
                Err(e)
            }
        }
    }
}
