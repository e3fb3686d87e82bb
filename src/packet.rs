//! Per-packet header snapshot
//!
//! The upstream capture/parsing layer hands the pipeline a read-only view
//! of the header fields the admission policy needs. The view is created
//! fresh for each packet and discarded after the decision; nothing here
//! touches the packet buffer itself.

use crate::protocol::tcp::TcpFlags;

/// Layer-3 protocol tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L3Proto {
    Ipv4,
    Ipv6,
    /// Anything else (ARP, MPLS, ...); always declined.
    Other,
}

/// Layer-4 protocol tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L4Proto {
    Icmp,
    Icmpv6,
    Tcp,
    /// Anything else (UDP, GRE, ...); always declined.
    Other,
}

/// Immutable header-field snapshot for one packet.
///
/// For a fragmented packet only the first fragment carries an L4 header,
/// so `l4_len` and the L4 fields are only meaningful when `fragmented` is
/// false; the classifier never trusts them otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketView {
    /// Total packet length in bytes, as charged against the budgets.
    pub len: u32,
    /// True if this packet is an IP fragment.
    pub fragmented: bool,
    pub l3_proto: L3Proto,
    pub l4_proto: L4Proto,
    /// Declared L4 header length in bytes.
    pub l4_len: usize,
    /// TCP flags; all-zero for non-TCP packets.
    pub tcp_flags: TcpFlags,
    /// TCP source port; zero for non-TCP packets.
    pub src_port: u16,
    /// TCP destination port; zero for non-TCP packets.
    pub dst_port: u16,
    /// ICMP message type; zero unless `l4_proto` is `Icmp`.
    pub icmp_type: u8,
    /// ICMPv6 message type; zero unless `l4_proto` is `Icmpv6`.
    pub icmpv6_type: u8,
}

impl PacketView {
    /// View for a non-fragmented IPv4 TCP packet with a full 20-byte header.
    pub fn tcp(len: u32, src_port: u16, dst_port: u16, flags: TcpFlags) -> Self {
        Self {
            len,
            fragmented: false,
            l3_proto: L3Proto::Ipv4,
            l4_proto: L4Proto::Tcp,
            l4_len: crate::protocol::tcp::MIN_HEADER_SIZE,
            tcp_flags: flags,
            src_port,
            dst_port,
            icmp_type: 0,
            icmpv6_type: 0,
        }
    }

    /// View for a non-fragmented ICMP-over-IPv4 packet.
    pub fn icmp(len: u32, msg_type: u8) -> Self {
        Self {
            len,
            fragmented: false,
            l3_proto: L3Proto::Ipv4,
            l4_proto: L4Proto::Icmp,
            l4_len: crate::protocol::icmp::HEADER_SIZE,
            tcp_flags: TcpFlags::default(),
            src_port: 0,
            dst_port: 0,
            icmp_type: msg_type,
            icmpv6_type: 0,
        }
    }

    /// View for a non-fragmented ICMPv6-over-IPv6 packet.
    pub fn icmpv6(len: u32, msg_type: u8) -> Self {
        Self {
            len,
            fragmented: false,
            l3_proto: L3Proto::Ipv6,
            l4_proto: L4Proto::Icmpv6,
            l4_len: crate::protocol::icmpv6::HEADER_SIZE,
            tcp_flags: TcpFlags::default(),
            src_port: 0,
            dst_port: 0,
            icmp_type: 0,
            icmpv6_type: msg_type,
        }
    }

    /// Marks the view as an IP fragment.
    pub fn fragment(mut self) -> Self {
        self.fragmented = true;
        self
    }
}
