//! Sweep orchestration.
//!
//! Fans out one probe task per enumerated target, joins them all, then
//! returns the discovered hosts in ascending numeric order. The join is the
//! run's single synchronization barrier; nothing reads the discovery set
//! before it.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use sweepr_common::config::Config;
use sweepr_common::network::addr;
use sweepr_common::network::range::ScanRange;

use crate::network::transport::ProbeTransport;
use crate::probe;

mod set;
pub use set::DiscoverySet;

/// Probes every address in `range` and returns the responders, sorted.
///
/// By default every target gets its own task at dispatch time, like the
/// original tool; `Config::max_inflight` throttles that through a semaphore
/// for ranges where full fan-out would exhaust descriptors. An empty
/// (reversed) range dispatches nothing and returns an empty list.
pub async fn perform_sweep(
    range: ScanRange,
    cfg: &Config,
    transport: Arc<dyn ProbeTransport>,
) -> Vec<Ipv4Addr> {
    let discovered = Arc::new(DiscoverySet::new());
    let limiter = cfg.max_inflight.map(|cap| Arc::new(Semaphore::new(cap)));

    let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(range.len());
    for (idx, target) in range.to_iter().enumerate() {
        let transport = Arc::clone(&transport);
        let discovered = Arc::clone(&discovered);
        let limiter = limiter.clone();
        let reply_timeout = cfg.reply_timeout;
        let seq = idx as u16;

        tasks.push(tokio::spawn(async move {
            let _permit = match &limiter {
                Some(sem) => Arc::clone(sem).acquire_owned().await.ok(),
                None => None,
            };
            probe::run_probe(transport.as_ref(), target, seq, reply_timeout, &discovered).await;
        }));
    }

    debug!("{} probe tasks dispatched", tasks.len());

    for task in tasks {
        if let Err(e) = task.await {
            error!("Probe task failed to complete: {e}");
        }
    }

    let mut hosts = discovered.snapshot();
    addr::sort_numeric(&mut hosts);
    hosts
}
