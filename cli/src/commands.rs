pub mod sweep;

use std::net::Ipv4Addr;

use clap::Parser;

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(about = "Discover live hosts in an IPv4 range with ICMP echo probes.")]
pub struct CommandLine {
    /// First address of the range, inclusive.
    pub start_addr: Ipv4Addr,

    /// Last address of the range, inclusive. A reversed pair scans nothing.
    pub end_addr: Ipv4Addr,

    /// Seconds each probe waits for its reply.
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Cap on in-flight probes. By default every target is dispatched at
    /// once, which is fine for a /24 and reckless for a /16.
    #[arg(long)]
    pub max_inflight: Option<usize>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
