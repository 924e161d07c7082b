use base64::engine::general_purpose::STANDARD as BASE64_STD;
use base64::Engine;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::runtime::Builder;

/// Spawn an HTTP server that exposes Prometheus metrics.
///
/// If the `METRICS_BASIC_AUTH` env-var is set (`USER:PASS`) every request must
/// supply a matching `Authorization: Basic <base64>` header.
pub fn serve_prometheus() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let auth_header = std::env::var("METRICS_BASIC_AUTH").ok().map(|raw| {
        let token = BASE64_STD.encode(raw);
        format!("Basic {token}")
    });

    let addr: SocketAddr = std::env::var("METRICS_BIND")
        .unwrap_or_else(|_| "127.0.0.1:9184".into())
        .parse()?;

    std::thread::spawn(move || {
        let runtime = match Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(target: "metrics", "metrics runtime failed: {e}");
                return;
            }
        };

        runtime.block_on(async move {
            let server = match hyper::Server::try_bind(&addr) {
                Ok(builder) => builder,
                Err(e) => {
                    tracing::error!(target: "metrics", "cannot bind {addr}: {e}");
                    return;
                }
            };
            tracing::info!(target: "metrics", "serving Prometheus metrics on {addr}");

            let server = server.serve(hyper::service::make_service_fn(move |_| {
                let handle = handle.clone();
                let auth_header = auth_header.clone();
                async move {
                    Ok::<_, hyper::Error>(hyper::service::service_fn(move |req| {
                        let handle = handle.clone();
                        let auth_header = auth_header.clone();
                        async move {
                            if let Some(expected) = auth_header {
                                match req.headers().get(hyper::header::AUTHORIZATION) {
                                    Some(h) if h.to_str().ok() == Some(&expected) => {}
                                    _ => {
                                        let mut resp = hyper::Response::new(hyper::Body::from("unauthorized"));
                                        *resp.status_mut() = hyper::StatusCode::UNAUTHORIZED;
                                        return Ok::<_, hyper::Error>(resp);
                                    }
                                }
                            }

                            let body = handle.render();
                            Ok::<_, hyper::Error>(hyper::Response::new(hyper::Body::from(body)))
                        }
                    }))
                }
            }));

            if let Err(e) = server.await {
                tracing::error!(target: "metrics", "metrics server exited: {e}");
            }
        });
    });

    Ok(())
}

// ---------------------------------------------------------------------------
// Screening metrics helpers
// ---------------------------------------------------------------------------

/// Number of distinct addresses held by the loaded denylist.
pub fn set_denylist_entries(n: usize) {
    metrics::gauge!("denylist_entries", n as f64);
}

/// Increment once per remote lookup, regardless of how many attempts it takes.
pub fn inc_screening_lookups() {
    metrics::increment_counter!("screening_lookups_total");
}

/// Increment for every HTTP request issued to the screening endpoint.
pub fn inc_screening_attempts() {
    metrics::increment_counter!("screening_attempts_total");
}

pub fn inc_screening_transport_failures() {
    metrics::increment_counter!("screening_transport_failures_total");
}

/// Record a final decision. `outcome` is `allowed`, `denied` or `error`;
/// `source` names what produced it (`denylist`, `remote`, `default`).
pub fn inc_verdict(outcome: &'static str, source: &'static str) {
    metrics::increment_counter!("verdicts_total", "outcome" => outcome, "source" => source);
}
