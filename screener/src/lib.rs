//! Address screening: a static local denylist backed by an optional remote
//! sanctions screening endpoint.

pub mod address;
pub mod config;
pub mod denylist;
pub mod error;
pub mod metrics;
pub mod screening;
pub mod verifier;

pub use address::Address;
pub use config::{RetryPolicy, VerifierConfig};
pub use denylist::Denylist;
pub use error::{Result, ScreeningError};
pub use screening::{HttpTransport, RemoteScreener, Transport};
pub use verifier::AddressVerifier;
