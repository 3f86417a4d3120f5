//! Ethernet/IP/transport dissection built on pnet packet views.

use std::fmt::Write;

use macaddr::MacAddr6;
use pnet::packet::arp::{ArpOperations, ArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::icmpv6::Icmpv6Packet;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;
use pnet::packet::Packet;
use pnet::util::MacAddr;

use super::FrameAnalyzer;
use crate::domain::{Dissection, FrameRecord};

/// Base pacing delays in milliseconds, per protocol label
mod base_delay {
    pub const TCP: u64 = 10;
    pub const UDP: u64 = 5;
    pub const ICMP: u64 = 20;
    pub const ARP: u64 = 50;
    pub const OTHER: u64 = 15;
}

/// Bytes per extra millisecond of pacing delay.
const BYTES_PER_DELAY_MS: usize = 100;

/// Analyzer for Ethernet II frames carrying IPv4, IPv6 or ARP.
#[derive(Debug, Default, Clone, Copy)]
pub struct PnetAnalyzer;

impl PnetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Pacing delay for a frame: a per-protocol base plus one millisecond
    /// per 100 bytes.
    pub fn estimate_delay_ms(protocol: &str, size_bytes: usize) -> u64 {
        let base = match protocol {
            "TCP" => base_delay::TCP,
            "UDP" => base_delay::UDP,
            "ICMP" | "ICMPv6" => base_delay::ICMP,
            "ARP" => base_delay::ARP,
            _ => base_delay::OTHER,
        };
        base + (size_bytes / BYTES_PER_DELAY_MS) as u64
    }

    fn dissect_ethernet(&self, ethernet: &EthernetPacket) -> Dissection {
        let mut dissection = Dissection {
            source_mac: Some(to_mac6(ethernet.get_source())),
            destination_mac: Some(to_mac6(ethernet.get_destination())),
            source_address: None,
            destination_address: None,
            protocol: "ETH".to_string(),
            summary: String::new(),
            estimated_delay_ms: 0,
        };

        match ethernet.get_ethertype() {
            EtherTypes::Ipv4 => match Ipv4Packet::new(ethernet.payload()) {
                Some(ipv4) => {
                    dissection.source_address = Some(ipv4.get_source().to_string());
                    dissection.destination_address = Some(ipv4.get_destination().to_string());
                    let (protocol, summary) =
                        transport_summary(ipv4.get_next_level_protocol(), ipv4.payload());
                    dissection.protocol = protocol;
                    dissection.summary = summary;
                }
                None => {
                    dissection.protocol = "IPv4".to_string();
                    dissection.summary = "Malformed IPv4 header".to_string();
                }
            },
            EtherTypes::Ipv6 => match Ipv6Packet::new(ethernet.payload()) {
                Some(ipv6) => {
                    dissection.source_address = Some(ipv6.get_source().to_string());
                    dissection.destination_address = Some(ipv6.get_destination().to_string());
                    let (protocol, summary) =
                        transport_summary(ipv6.get_next_header(), ipv6.payload());
                    dissection.protocol = protocol;
                    dissection.summary = summary;
                }
                None => {
                    dissection.protocol = "IPv6".to_string();
                    dissection.summary = "Malformed IPv6 header".to_string();
                }
            },
            EtherTypes::Arp => match ArpPacket::new(ethernet.payload()) {
                Some(arp) => {
                    dissection.source_address = Some(arp.get_sender_proto_addr().to_string());
                    dissection.destination_address = Some(arp.get_target_proto_addr().to_string());
                    dissection.protocol = "ARP".to_string();
                    dissection.summary = if arp.get_operation() == ArpOperations::Reply {
                        format!(
                            "{} is at {}",
                            arp.get_sender_proto_addr(),
                            arp.get_sender_hw_addr()
                        )
                    } else {
                        format!(
                            "Who has {}? Tell {}",
                            arp.get_target_proto_addr(),
                            arp.get_sender_proto_addr()
                        )
                    };
                }
                None => {
                    dissection.protocol = "ARP".to_string();
                    dissection.summary = "Malformed ARP packet".to_string();
                }
            },
            other => {
                dissection.protocol = format!("0x{:04x}", other.0);
                dissection.summary = "Unknown L3 protocol".to_string();
            }
        }

        dissection
    }
}

impl FrameAnalyzer for PnetAnalyzer {
    fn dissect(&self, raw: &[u8]) -> Dissection {
        let mut dissection = match EthernetPacket::new(raw) {
            Some(ethernet) => self.dissect_ethernet(&ethernet),
            None => Dissection::unparsed(0),
        };
        dissection.estimated_delay_ms = Self::estimate_delay_ms(&dissection.protocol, raw.len());
        dissection
    }

    fn render_details(&self, frame: &FrameRecord) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Frame #{} captured at {}", frame.id(), frame.timestamp_str());
        let _ = writeln!(
            out,
            "  Size: {} bytes | Protocol: {} | Estimated delay: {} ms | Retries: {}",
            frame.size_bytes(),
            frame.protocol(),
            frame.estimated_delay_ms(),
            frame.retry_count()
        );
        let _ = writeln!(out, "  Summary: {}", frame.summary());

        if let Some(ethernet) = EthernetPacket::new(frame.payload()) {
            render_ethernet(&mut out, &ethernet);
        }

        let _ = writeln!(out, "Hex dump");
        let _ = writeln!(out, "{}", pretty_hex::pretty_hex(&frame.payload()));
        out
    }
}

fn to_mac6(mac: MacAddr) -> MacAddr6 {
    MacAddr6::from(mac.octets())
}

/// Protocol label and one-line summary for an IP payload.
fn transport_summary(protocol: IpNextHeaderProtocol, payload: &[u8]) -> (String, String) {
    match protocol {
        IpNextHeaderProtocols::Tcp => match TcpPacket::new(payload) {
            Some(tcp) => (
                "TCP".to_string(),
                format!(
                    "{} -> {} Seq: {} Ack: {}",
                    tcp.get_source(),
                    tcp.get_destination(),
                    tcp.get_sequence(),
                    tcp.get_acknowledgement()
                ),
            ),
            None => ("TCP".to_string(), "Malformed TCP header".to_string()),
        },
        IpNextHeaderProtocols::Udp => match UdpPacket::new(payload) {
            Some(udp) => (
                "UDP".to_string(),
                format!(
                    "{} -> {} Len: {}",
                    udp.get_source(),
                    udp.get_destination(),
                    udp.get_length()
                ),
            ),
            None => ("UDP".to_string(), "Malformed UDP header".to_string()),
        },
        IpNextHeaderProtocols::Icmp => match IcmpPacket::new(payload) {
            Some(icmp) => (
                "ICMP".to_string(),
                format!(
                    "Type: {} Code: {}",
                    icmp.get_icmp_type().0,
                    icmp.get_icmp_code().0
                ),
            ),
            None => ("ICMP".to_string(), "Malformed ICMP header".to_string()),
        },
        IpNextHeaderProtocols::Icmpv6 => match Icmpv6Packet::new(payload) {
            Some(icmp) => (
                "ICMPv6".to_string(),
                format!(
                    "Type: {} Code: {}",
                    icmp.get_icmpv6_type().0,
                    icmp.get_icmpv6_code().0
                ),
            ),
            None => ("ICMPv6".to_string(), "Malformed ICMPv6 header".to_string()),
        },
        other => (format!("IP-{}", other.0), String::new()),
    }
}

fn render_ethernet(out: &mut String, ethernet: &EthernetPacket) {
    let _ = writeln!(out, "Ethernet");
    let _ = writeln!(out, "  Source MAC: {}", ethernet.get_source());
    let _ = writeln!(out, "  Destination MAC: {}", ethernet.get_destination());
    let _ = writeln!(out, "  EtherType: {}", ethernet.get_ethertype());

    match ethernet.get_ethertype() {
        EtherTypes::Ipv4 => {
            if let Some(ipv4) = Ipv4Packet::new(ethernet.payload()) {
                let _ = writeln!(out, "IPv4");
                let _ = writeln!(out, "  Source: {}", ipv4.get_source());
                let _ = writeln!(out, "  Destination: {}", ipv4.get_destination());
                let _ = writeln!(out, "  TTL: {}", ipv4.get_ttl());
                let _ = writeln!(out, "  Total length: {}", ipv4.get_total_length());
                let _ = writeln!(out, "  Protocol: {}", ipv4.get_next_level_protocol());
                render_transport(out, ipv4.get_next_level_protocol(), ipv4.payload());
            }
        }
        EtherTypes::Ipv6 => {
            if let Some(ipv6) = Ipv6Packet::new(ethernet.payload()) {
                let _ = writeln!(out, "IPv6");
                let _ = writeln!(out, "  Source: {}", ipv6.get_source());
                let _ = writeln!(out, "  Destination: {}", ipv6.get_destination());
                let _ = writeln!(out, "  Hop limit: {}", ipv6.get_hop_limit());
                let _ = writeln!(out, "  Payload length: {}", ipv6.get_payload_length());
                let _ = writeln!(out, "  Next header: {}", ipv6.get_next_header());
                render_transport(out, ipv6.get_next_header(), ipv6.payload());
            }
        }
        EtherTypes::Arp => {
            if let Some(arp) = ArpPacket::new(ethernet.payload()) {
                let _ = writeln!(out, "ARP");
                let _ = writeln!(out, "  Operation: {}", arp.get_operation().0);
                let _ = writeln!(out, "  Sender: {} ({})", arp.get_sender_proto_addr(), arp.get_sender_hw_addr());
                let _ = writeln!(out, "  Target: {} ({})", arp.get_target_proto_addr(), arp.get_target_hw_addr());
            }
        }
        _ => {}
    }
}

fn render_transport(out: &mut String, protocol: IpNextHeaderProtocol, payload: &[u8]) {
    match protocol {
        IpNextHeaderProtocols::Tcp => {
            if let Some(tcp) = TcpPacket::new(payload) {
                let _ = writeln!(out, "TCP");
                let _ = writeln!(out, "  Source port: {}", tcp.get_source());
                let _ = writeln!(out, "  Destination port: {}", tcp.get_destination());
                let _ = writeln!(out, "  Sequence: {}", tcp.get_sequence());
                let _ = writeln!(out, "  Acknowledgement: {}", tcp.get_acknowledgement());
                let _ = writeln!(out, "  Flags: {:#04x}", tcp.get_flags());
                let _ = writeln!(out, "  Window: {}", tcp.get_window());
            }
        }
        IpNextHeaderProtocols::Udp => {
            if let Some(udp) = UdpPacket::new(payload) {
                let _ = writeln!(out, "UDP");
                let _ = writeln!(out, "  Source port: {}", udp.get_source());
                let _ = writeln!(out, "  Destination port: {}", udp.get_destination());
                let _ = writeln!(out, "  Length: {}", udp.get_length());
            }
        }
        _ => {}
    }
}
