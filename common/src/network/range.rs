use std::net::Ipv4Addr;

/// A closed inclusive span of IPv4 addresses, `[start_addr, end_addr]`.
///
/// A reversed pair (`start_addr > end_addr`) is a valid range with zero
/// targets, not an error; rejecting malformed input is the job of whatever
/// produced the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanRange {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl ScanRange {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Enumerates every target in ascending order.
    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if start > end {
            0
        } else {
            (end - start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
