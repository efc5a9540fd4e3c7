//! Per-target probe lifecycle: build the request, run the exchange, record
//! the outcome. Terminal in one pass; there are no retries.

use std::net::Ipv4Addr;
use std::process;
use std::time::Duration;

use tracing::{error, info};

use sweepr_common::error::ScanError;

use crate::discovery::DiscoverySet;
use crate::network::transport::ProbeTransport;

/// Identifies one outstanding echo exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRequest {
    pub target: Ipv4Addr,
    pub ident: u16,
    pub seq: u16,
}

impl ProbeRequest {
    /// `seq` is the target's position in the enumerated range. The identifier
    /// folds the process id on top of it so this run's packets are unlikely
    /// to collide with unrelated ICMP traffic on the host.
    ///
    /// Both fields are 16 bits wide on the wire, so ranges beyond 65536
    /// targets wrap and may alias exchange keys.
    pub fn new(target: Ipv4Addr, seq: u16) -> Self {
        let ident = ((process::id() & 0xffff) as u16).wrapping_add(seq);
        Self { target, ident, seq }
    }

    /// The pair replies are routed by.
    pub fn key(&self) -> (u16, u16) {
        (self.ident, self.seq)
    }
}

/// What a single dispatched probe produced. Consumed immediately by the
/// prober task; never retained.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// A matching echo reply arrived from this address.
    Alive(Ipv4Addr),
    /// Nothing matching came back within the deadline. Expected for
    /// unresponsive targets; not a failure.
    Timeout,
    /// The exchange never completed for transport reasons.
    TransportError(ScanError),
}

/// Probes one target and records the outcome.
///
/// Only an alive outcome touches shared state. Transport errors are
/// diagnostics, never fatal: a target that cannot be probed contributes
/// nothing and the run carries on.
pub async fn run_probe(
    transport: &dyn ProbeTransport,
    target: Ipv4Addr,
    seq: u16,
    reply_timeout: Duration,
    discovered: &DiscoverySet,
) {
    let request = ProbeRequest::new(target, seq);
    match transport.exchange(request, reply_timeout).await {
        ProbeOutcome::Alive(sender_addr) => {
            if discovered.insert(sender_addr) {
                info!("Found host: {sender_addr}");
            }
        }
        ProbeOutcome::Timeout => {}
        ProbeOutcome::TransportError(e) => error!("Probing {target} failed: {e}"),
    }
}
