use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Mutex;

/// Deduplicating accumulator of responding hosts.
///
/// Every in-flight probe task inserts concurrently; the orchestrator reads it
/// once, after all tasks have joined. Insertion order is first-seen, which is
/// what the interactive log reflects; the final output ordering is applied by
/// the sorter afterwards.
#[derive(Debug, Default)]
pub struct DiscoverySet {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    seen: HashSet<Ipv4Addr>,
    order: Vec<Ipv4Addr>,
}

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a responding host. Returns `true` the first time an address
    /// is seen, `false` on every repeat.
    pub fn insert(&self, host: Ipv4Addr) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.seen.insert(host) {
            inner.order.push(host);
            true
        } else {
            false
        }
    }

    /// All recorded hosts, first-seen order.
    pub fn snapshot(&self) -> Vec<Ipv4Addr> {
        self.inner.lock().unwrap().order.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
