use std::time::Duration;

/// Per-run knobs for the sweep engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// How long each probe waits for its reply before giving up.
    pub reply_timeout: Duration,

    /// Cap on concurrently in-flight probes.
    ///
    /// `None` dispatches one task per target up front, which matches small
    /// ranges fine but will exhaust descriptors on something like a /16.
    pub max_inflight: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(5),
            max_inflight: None,
        }
    }
}
