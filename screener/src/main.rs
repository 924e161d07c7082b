use anyhow::{Context, Result};
use clap::Parser;
use screener::{metrics, Address, AddressVerifier, RetryPolicy, VerifierConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Screen addresses against a local denylist and an optional remote
/// sanctions screening endpoint.
#[derive(Parser, Debug)]
#[command(name = "screener", version)]
struct Cli {
    /// JSON array of denylisted addresses. Empty disables local screening.
    #[arg(long, env = "SCREENING_DENYLIST", default_value = "")]
    denylist: String,

    /// Base URL the address is appended to, e.g. `https://screen.example/`.
    /// Empty disables remote screening.
    #[arg(long, env = "SCREENING_URL", default_value = "")]
    screening_url: String,

    /// Expose Prometheus metrics (see `METRICS_BIND`).
    #[arg(long)]
    metrics: bool,

    /// Addresses to check. Read one per line from stdin when omitted.
    addresses: Vec<String>,
}

#[derive(Default)]
struct Tally {
    denied: usize,
    errors: usize,
}

impl Tally {
    fn exit_code(&self) -> i32 {
        if self.errors > 0 {
            2
        } else if self.denied > 0 {
            1
        } else {
            0
        }
    }
}

async fn check(verifier: &AddressVerifier, raw: &str, tally: &mut Tally) {
    let result = match raw.parse::<Address>() {
        Ok(addr) => verifier.is_allowed(&addr).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(true) => println!("{raw} allowed"),
        Ok(false) => {
            tally.denied += 1;
            println!("{raw} denied");
        }
        Err(e) => {
            tally.errors += 1;
            tracing::error!(target: "screener", "{raw}: {e}");
            println!("{raw} error: {e}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.metrics {
        metrics::serve_prometheus().context("starting metrics exporter")?;
    }

    let config = VerifierConfig::new(&cli.denylist, cli.screening_url.trim())
        .with_retry(RetryPolicy::from_env());
    let verifier = AddressVerifier::new(&config).context("building address verifier")?;

    let mut tally = Tally::default();
    if cli.addresses.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("reading stdin")? {
            let raw = line.trim();
            if !raw.is_empty() {
                check(&verifier, raw, &mut tally).await;
            }
        }
    } else {
        for raw in &cli.addresses {
            check(&verifier, raw.trim(), &mut tally).await;
        }
    }

    std::process::exit(tally.exit_code());
}
