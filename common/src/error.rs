use thiserror::Error;

/// Failures that the sweep engine can produce.
///
/// Timeouts are deliberately absent: an unanswered probe is an expected
/// outcome, not an error (see `ProbeOutcome` in the core crate).
#[derive(Debug, Error)]
pub enum ScanError {
    /// The given text is not a dotted-decimal IPv4 address.
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),

    /// Opening, sending on, or reading from the probe socket failed.
    ///
    /// Fatal when raised while opening the socket; local to one target
    /// otherwise.
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),
}
