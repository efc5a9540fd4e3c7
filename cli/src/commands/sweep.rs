use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::info;

use sweepr_common::config::Config;
use sweepr_common::network::range::ScanRange;
use sweepr_core::discovery;
use sweepr_core::network::transport::IcmpTransport;

pub async fn sweep(range: ScanRange, cfg: &Config) -> anyhow::Result<()> {
    // No socket, no run. Everything past this point degrades per target.
    let transport = IcmpTransport::open()
        .context("cannot start the sweep without a raw ICMP socket (try again as root)")?;

    info!(
        "Sweeping {} targets ({} - {})",
        range.len(),
        range.start_addr,
        range.end_addr
    );

    let start_time = Instant::now();
    let hosts = discovery::perform_sweep(range, cfg, Arc::new(transport)).await;

    report(&hosts, start_time.elapsed());
    Ok(())
}

/// Final report: unique count, then the sorted list one address per line.
fn report(hosts: &[Ipv4Addr], total_time: Duration) {
    let count = format!("{} unique hosts", hosts.len()).bold().green();
    let elapsed = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    println!("Sweep complete: {count} in {elapsed}");

    for host in hosts {
        println!("{host}");
    }
}
