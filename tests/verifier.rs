use mockito::Server;
use screener::error::BoxError;
use screener::{
    Address, AddressVerifier, Denylist, RemoteScreener, RetryPolicy, Transport, VerifierConfig,
};
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;

const BANNED: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const CLEAN: &str = "0x1234000000000000000000000000000000000000";

fn addr(s: &str) -> Address {
    s.parse().expect("valid address")
}

/// Transport that counts requests and answers every one with a fixed verdict,
/// or refuses all connections when `verdict` is `None`.
#[derive(Clone, Default)]
struct Fixed {
    verdict: Option<bool>,
    calls: Arc<AtomicU32>,
}

impl Fixed {
    fn answering(verdict: bool) -> Self {
        Self {
            verdict: Some(verdict),
            ..Self::default()
        }
    }

    fn unreachable() -> Self {
        Self::default()
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for Fixed {
    type Response = bool;

    async fn get(&self, _url: &str) -> Result<bool, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.ok_or_else(|| "connection refused".into())
    }

    async fn read_body(&self, verdict: bool) -> Result<Vec<u8>, BoxError> {
        Ok(format!(r#"{{"addressAllowed": {verdict}}}"#).into_bytes())
    }
}

fn verifier_with(transport: Option<Fixed>) -> AddressVerifier<Fixed> {
    let denylist: Denylist = [addr(BANNED)].into_iter().collect();
    let remote = transport.map(|t| {
        RemoteScreener::with_transport("https://screen.example/", t, RetryPolicy::immediate(5))
    });
    AddressVerifier::with_parts(denylist, remote)
}

#[tokio::test]
async fn denylisted_address_never_reaches_remote() {
    for transport in [Fixed::answering(true), Fixed::unreachable()] {
        let verifier = verifier_with(Some(transport.clone()));
        assert!(!verifier.is_allowed(&addr(BANNED)).await.expect("local verdict"));
        assert_eq!(transport.calls(), 0);
    }

    let verifier = verifier_with(None);
    assert!(!verifier.is_allowed(&addr(BANNED)).await.expect("local verdict"));
}

#[tokio::test]
async fn unlisted_address_is_allowed_without_remote() {
    let verifier = verifier_with(None);
    assert!(verifier.is_allowed(&addr(CLEAN)).await.expect("default verdict"));
}

#[tokio::test]
async fn unlisted_address_takes_remote_verdict() {
    let deny = Fixed::answering(false);
    let verifier = verifier_with(Some(deny.clone()));
    assert!(!verifier.is_allowed(&addr(CLEAN)).await.expect("remote verdict"));
    assert_eq!(deny.calls(), 1);

    let allow = Fixed::answering(true);
    let verifier = verifier_with(Some(allow.clone()));
    assert!(verifier.is_allowed(&addr(CLEAN)).await.expect("remote verdict"));
    assert_eq!(allow.calls(), 1);
}

#[tokio::test]
async fn remote_failure_is_not_permission() {
    let transport = Fixed::unreachable();
    let verifier = verifier_with(Some(transport.clone()));

    let err = verifier.is_allowed(&addr(CLEAN)).await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
    assert_eq!(transport.calls(), 5);
}

#[tokio::test]
async fn repeated_calls_agree() {
    let verifier = verifier_with(Some(Fixed::answering(false)));
    for _ in 0..3 {
        assert!(!verifier.is_allowed(&addr(BANNED)).await.unwrap());
        assert!(!verifier.is_allowed(&addr(CLEAN)).await.unwrap());
    }

    let verifier = verifier_with(None);
    for _ in 0..3 {
        assert!(verifier.is_allowed(&addr(CLEAN)).await.unwrap());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_verifier_serves_concurrent_callers() {
    let transport = Fixed::answering(true);
    let verifier = Arc::new(verifier_with(Some(transport.clone())));

    let mut handles = Vec::new();
    for i in 0..32 {
        let verifier = Arc::clone(&verifier);
        handles.push(tokio::spawn(async move {
            let target = if i % 2 == 0 { BANNED } else { CLEAN };
            (target, verifier.is_allowed(&addr(target)).await.expect("verdict"))
        }));
    }

    for h in handles {
        let (target, allowed) = h.await.expect("join error");
        assert_eq!(allowed, target == CLEAN);
    }
    assert_eq!(transport.calls(), 16);
}

#[tokio::test]
async fn built_from_config_with_mock_endpoint() {
    let mut denylist = NamedTempFile::new().expect("tmp file");
    write!(denylist, r#"["{BANNED}"]"#).expect("write denylist");

    let clean = addr(CLEAN);
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", format!("/{clean}").as_str())
        .with_status(200)
        .with_body(r#"{"addressAllowed": false}"#)
        .expect(1)
        .create_async()
        .await;

    let config = VerifierConfig::new(denylist.path(), format!("{}/", server.url()))
        .with_retry(RetryPolicy::immediate(5));
    let verifier = AddressVerifier::new(&config).expect("verifier");

    assert_eq!(verifier.denylist().len(), 1);
    assert!(!verifier.is_allowed(&addr(BANNED)).await.unwrap());
    assert!(!verifier.is_allowed(&clean).await.unwrap());
    m.assert_async().await;
}

#[tokio::test]
async fn empty_config_allows_everything() {
    let verifier = AddressVerifier::new(&VerifierConfig::default()).expect("verifier");

    assert!(verifier.denylist().is_empty());
    assert!(verifier.remote().is_none());
    assert!(verifier.is_allowed(&addr(BANNED)).await.unwrap());
}

#[test]
fn unreadable_denylist_fails_construction() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = VerifierConfig::new(dir.path().join("missing.json"), "");
    let err = AddressVerifier::new(&config).unwrap_err();
    assert!(err.is_read(), "unexpected error: {err}");
}
