//! The shared probe socket.
//!
//! One raw ICMP channel serves every concurrent probe in the run: opening a
//! socket per target would burn through descriptors for nothing, since echo
//! replies are correlated by the (identifier, sequence) pair embedded in the
//! packet, not by socket identity.
//!
//! The receive half is drained by a single router thread. Each reply is
//! handed to the probe that registered the matching pair before sending;
//! replies that match nothing (unrelated host traffic, duplicates arriving
//! after their probe finished) are dropped. The original tool instead
//! credited whichever reply a waiting probe happened to read first, so it
//! could record a different host than the one it pinged while many probes
//! were in flight.

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pnet::packet::{
    Packet,
    icmp::{IcmpPacket, IcmpTypes, echo_reply::EchoReplyPacket, echo_request},
    ip::IpNextHeaderProtocols,
};
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
};
use pnet::util;
use tokio::sync::oneshot;
use tracing::debug;

use sweepr_common::error::ScanError;

use crate::probe::{ProbeOutcome, ProbeRequest};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

/// Echo payload carried by every request, as in the original tool.
const ECHO_PAYLOAD: &[u8] = b"T";

type PendingMap = HashMap<(u16, u16), oneshot::Sender<Ipv4Addr>>;

/// A transport capable of running one echo exchange end to end.
///
/// The trait seam exists so the sweep orchestrator can be exercised without a
/// raw socket (and therefore without root).
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Sends the request and waits up to `reply_timeout` for its reply.
    async fn exchange(&self, request: ProbeRequest, reply_timeout: Duration) -> ProbeOutcome;
}

/// The real thing: a raw ICMP Layer4 channel plus the reply router thread.
pub struct IcmpTransport {
    sender: Mutex<TransportSender>,
    pending: Arc<Mutex<PendingMap>>,
}

impl IcmpTransport {
    /// Opens the run's raw ICMP socket and starts the reply router.
    ///
    /// Failure here is fatal to the run; on most systems it means the process
    /// lacks the privilege to open raw sockets.
    ///
    /// The router thread blocks inside the packet iterator and is only torn
    /// down at process exit; the send half is released when the transport is
    /// dropped after the run's join barrier.
    pub fn open() -> anyhow::Result<Self> {
        let (tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
            .context("failed to open raw ICMP socket")?;

        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(HashMap::new()));
        spawn_reply_router(rx, Arc::clone(&pending));

        Ok(Self {
            sender: Mutex::new(tx),
            pending,
        })
    }

    fn send_echo(&self, request: &ProbeRequest) -> Result<(), ScanError> {
        let mut buf =
            vec![0u8; echo_request::MutableEchoRequestPacket::minimum_packet_size() + ECHO_PAYLOAD.len()];
        let packet = build_echo_request(&mut buf, request)
            .ok_or_else(|| ScanError::Transport(io::Error::other("echo request buffer too small")))?;

        self.sender
            .lock()
            .unwrap()
            .send_to(packet, IpAddr::V4(request.target))?;
        Ok(())
    }
}

#[async_trait]
impl ProbeTransport for IcmpTransport {
    async fn exchange(&self, request: ProbeRequest, reply_timeout: Duration) -> ProbeOutcome {
        // Register before sending so a fast reply cannot slip past the router.
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(request.key(), reply_tx);

        if let Err(e) = self.send_echo(&request) {
            self.pending.lock().unwrap().remove(&request.key());
            return ProbeOutcome::TransportError(e);
        }

        match tokio::time::timeout(reply_timeout, reply_rx).await {
            Ok(Ok(sender_addr)) => ProbeOutcome::Alive(sender_addr),
            // Router dropped our waiter without answering it.
            Ok(Err(_)) => ProbeOutcome::Timeout,
            Err(_) => {
                self.pending.lock().unwrap().remove(&request.key());
                ProbeOutcome::Timeout
            }
        }
    }
}

fn spawn_reply_router(mut rx: TransportReceiver, pending: Arc<Mutex<PendingMap>>) {
    std::thread::spawn(move || {
        let mut iterator = transport::icmp_packet_iter(&mut rx);
        loop {
            match iterator.next() {
                Ok((packet, sender_addr)) => route_reply(&pending, &packet, sender_addr),
                Err(e) => debug!("probe socket read failed: {e}"),
            }
        }
    });
}

/// Hands an echo reply to the probe that registered its (identifier,
/// sequence) pair. Everything else on the wire is ignored.
fn route_reply(pending: &Mutex<PendingMap>, packet: &IcmpPacket<'_>, sender_addr: IpAddr) {
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return;
    }
    let Some(reply) = EchoReplyPacket::new(packet.packet()) else {
        return;
    };
    let IpAddr::V4(sender_addr) = sender_addr else {
        return;
    };

    let key = (reply.get_identifier(), reply.get_sequence_number());
    if let Some(waiter) = pending.lock().unwrap().remove(&key) {
        let _ = waiter.send(sender_addr);
    }
}

fn build_echo_request<'a>(
    buf: &'a mut [u8],
    request: &ProbeRequest,
) -> Option<echo_request::MutableEchoRequestPacket<'a>> {
    let mut packet = echo_request::MutableEchoRequestPacket::new(buf)?;
    packet.set_icmp_type(IcmpTypes::EchoRequest);
    packet.set_icmp_code(echo_request::IcmpCodes::NoCode);
    packet.set_identifier(request.ident);
    packet.set_sequence_number(request.seq);
    packet.set_payload(ECHO_PAYLOAD);

    let checksum = util::checksum(packet.packet(), 1);
    packet.set_checksum(checksum);
    Some(packet)
}
