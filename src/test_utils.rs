//! Test helpers: a scripted link handle and frame builders.

use std::collections::VecDeque;
use std::io;
use std::net::Ipv4Addr;

use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, MutableArpPacket};
use pnet::packet::ethernet::{EtherType, EtherTypes, MutableEthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;
use pnet::util::MacAddr;

use crate::capture::{CancelToken, LinkHandle};

const ETHERNET_HEADER_LEN: usize = 14;
const IPV4_HEADER_LEN: usize = 20;
const UDP_HEADER_LEN: usize = 8;
const TCP_HEADER_LEN: usize = 20;
const ARP_PACKET_LEN: usize = 28;

pub const SOURCE_MAC: MacAddr = MacAddr(0x02, 0, 0, 0, 0, 0x01);
pub const DESTINATION_MAC: MacAddr = MacAddr(0x02, 0, 0, 0, 0, 0x02);

/// How the mock answers a `send_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendBehavior {
    Succeed,
    Fail,
    ShortWrite,
}

/// In-memory link handle with a scripted receive side.
///
/// When the receive script runs dry the mock interrupts the attached token,
/// so a capture loop ends without waiting for its deadline.
pub struct MockLink {
    name: String,
    incoming: VecDeque<io::Result<Option<Vec<u8>>>>,
    send_script: VecDeque<SendBehavior>,
    default_send: SendBehavior,
    cancel_on_idle: Option<CancelToken>,
    /// Every frame passed to `send_frame`, in call order
    pub attempts: Vec<Vec<u8>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self {
            name: "mock0".to_string(),
            incoming: VecDeque::new(),
            send_script: VecDeque::new(),
            default_send: SendBehavior::Succeed,
            cancel_on_idle: None,
            attempts: Vec::new(),
        }
    }

    pub fn with_frames(mut self, frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.incoming
            .extend(frames.into_iter().map(|frame| Ok(Some(frame))));
        self
    }

    pub fn push_read(&mut self, read: io::Result<Option<Vec<u8>>>) {
        self.incoming.push_back(read);
    }

    pub fn cancel_when_idle(mut self, token: &CancelToken) -> Self {
        self.cancel_on_idle = Some(token.clone());
        self
    }

    /// Behavior for sends not covered by the per-call script.
    pub fn set_default_send(&mut self, behavior: SendBehavior) {
        self.default_send = behavior;
    }

    /// Queue behaviors for the next sends, in order.
    pub fn script_sends(&mut self, behaviors: impl IntoIterator<Item = SendBehavior>) {
        self.send_script.extend(behaviors);
    }
}

impl LinkHandle for MockLink {
    fn interface_name(&self) -> &str {
        &self.name
    }

    fn recv_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.incoming.pop_front() {
            Some(read) => read,
            None => {
                if let Some(token) = &self.cancel_on_idle {
                    // same path as Ctrl+C: only effective while a capture is armed
                    token.interrupt();
                }
                Ok(None)
            }
        }
    }

    fn send_frame(&mut self, frame: &[u8]) -> io::Result<usize> {
        self.attempts.push(frame.to_vec());
        let behavior = self.send_script.pop_front().unwrap_or(self.default_send);
        match behavior {
            SendBehavior::Succeed => Ok(frame.len()),
            SendBehavior::ShortWrite => Ok(frame.len() / 2),
            SendBehavior::Fail => Err(io::Error::new(io::ErrorKind::Other, "link down")),
        }
    }
}

/// Ethernet + IPv4 + UDP frame of exactly `frame_len` bytes (or the minimum
/// header size if smaller).
pub fn ipv4_udp_frame(source: Ipv4Addr, destination: Ipv4Addr, frame_len: usize) -> Vec<u8> {
    let transport_offset = ETHERNET_HEADER_LEN + IPV4_HEADER_LEN;
    let mut buf = vec![0u8; frame_len.max(transport_offset + UDP_HEADER_LEN)];
    let len = buf.len();

    write_ethernet(&mut buf, EtherTypes::Ipv4);
    write_ipv4(&mut buf, source, destination, IpNextHeaderProtocols::Udp);

    let mut udp = MutableUdpPacket::new(&mut buf[transport_offset..]).expect("udp header");
    udp.set_source(5000);
    udp.set_destination(6000);
    udp.set_length((len - transport_offset) as u16);
    buf
}

/// Ethernet + IPv4 + TCP frame of exactly `frame_len` bytes.
pub fn ipv4_tcp_frame(source: Ipv4Addr, destination: Ipv4Addr, frame_len: usize) -> Vec<u8> {
    let transport_offset = ETHERNET_HEADER_LEN + IPV4_HEADER_LEN;
    let mut buf = vec![0u8; frame_len.max(transport_offset + TCP_HEADER_LEN)];

    write_ethernet(&mut buf, EtherTypes::Ipv4);
    write_ipv4(&mut buf, source, destination, IpNextHeaderProtocols::Tcp);

    let mut tcp = MutableTcpPacket::new(&mut buf[transport_offset..]).expect("tcp header");
    tcp.set_source(40000);
    tcp.set_destination(80);
    tcp.set_sequence(1);
    tcp.set_data_offset(5);
    tcp.set_window(0xffff);
    buf
}

/// ARP who-has request from `sender` for `target`.
pub fn arp_request_frame(sender: Ipv4Addr, target: Ipv4Addr) -> Vec<u8> {
    let mut buf = vec![0u8; ETHERNET_HEADER_LEN + ARP_PACKET_LEN];
    write_ethernet(&mut buf, EtherTypes::Arp);

    let mut arp = MutableArpPacket::new(&mut buf[ETHERNET_HEADER_LEN..]).expect("arp packet");
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(SOURCE_MAC);
    arp.set_sender_proto_addr(sender);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(target);
    buf
}

fn write_ethernet(buf: &mut [u8], ethertype: EtherType) {
    let mut ethernet = MutableEthernetPacket::new(buf).expect("ethernet header");
    ethernet.set_source(SOURCE_MAC);
    ethernet.set_destination(DESTINATION_MAC);
    ethernet.set_ethertype(ethertype);
}

fn write_ipv4(
    buf: &mut [u8],
    source: Ipv4Addr,
    destination: Ipv4Addr,
    protocol: IpNextHeaderProtocol,
) {
    let total_length = (buf.len() - ETHERNET_HEADER_LEN) as u16;
    let mut ipv4 = MutableIpv4Packet::new(&mut buf[ETHERNET_HEADER_LEN..]).expect("ipv4 header");
    ipv4.set_version(4);
    ipv4.set_header_length(5);
    ipv4.set_total_length(total_length);
    ipv4.set_ttl(64);
    ipv4.set_next_level_protocol(protocol);
    ipv4.set_source(source);
    ipv4.set_destination(destination);
}
