mod commands;
mod terminal;

use std::time::Duration;

use commands::{CommandLine, sweep};
use sweepr_common::config::Config;
use sweepr_common::network::range::ScanRange;
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommandLine::parse_args();

    terminal::logging::init();

    if !is_root::is_root() {
        warn!("Not running as root; opening the raw ICMP socket will likely fail");
    }

    let cfg = Config {
        reply_timeout: Duration::from_secs(args.timeout),
        max_inflight: args.max_inflight,
    };
    let range = ScanRange::new(args.start_addr, args.end_addr);

    sweep::sweep(range, &cfg).await
}
