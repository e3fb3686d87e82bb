//! Protocol admission policy
//!
//! The core classifier: a pure function from one [`PacketView`] to a
//! [`Decision`]. It encodes the fixed admission matrix for a web server
//! host running HTTP, HTTPS, SSH, and FTP:
//! - ICMP/ICMPv6 control messages from a closed admitted set pass, but
//!   only against the secondary budget.
//! - Fragmented TCP passes only against the secondary budget (its header
//!   fields cannot be trusted).
//! - Non-fragmented TCP is admitted per destination port: SYN-ACKs to
//!   listening ports and bare SYNs everywhere except the listening ports
//!   are declined, and traffic to unlisted ports must come from an
//!   HTTP/HTTPS peer the server itself connected out to.
//!
//! The classifier touches no shared state and performs a constant number
//! of field comparisons, so it can run on independent worker lanes with
//! zero coordination.

use crate::packet::{L3Proto, L4Proto, PacketView};
use crate::protocol::{icmp, icmpv6, tcp};
use std::ops::RangeInclusive;

/// Admission decision for one packet. Terminal once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Forward the packet.
    Forward,
    /// Drop the packet; the reason is for host-side accounting only.
    Decline(DeclineReason),
    /// Admissible, but must pass the secondary budget gate first.
    NeedSecondary,
}

/// Why a packet was declined. All reasons are terminal and non-retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// L4 header shorter than the protocol minimum, or an untrustworthy
    /// fragmented control message.
    MalformedHeader,
    /// L4 protocol outside {ICMP, ICMPv6, TCP}, or ICMP/ICMPv6 over the
    /// wrong network layer.
    UnsupportedProtocol,
    /// ICMP/ICMPv6 message type outside the admitted set.
    UnsupportedMessageType,
    /// TCP port combination the policy does not allow.
    UnauthorizedPort,
    /// Inbound SYN-ACK to a listening port; reflection-abuse symptom.
    AmplificationSuspect,
    /// A budget gate refused the packet. Reported by the pipeline, never
    /// by the classifier itself.
    BudgetExceeded,
}

/// FTP data port for active mode, where the server originates the
/// connection.
pub const FTP_DATA_PORT: u16 = 20;

/// Ports the server listens on: FTP command, SSH, HTTP, HTTPS.
pub const LISTENING_PORTS: [u16; 4] = [21, 22, 80, 443];

/// Passive-mode FTP data ports. Must match the range configured in the
/// FTP daemon.
pub const FTP_PASSIVE_RANGE: RangeInclusive<u16> = 51000..=51999;

/// Remote service ports the server may connect out to as a client.
pub const EGRESS_PEER_PORTS: [u16; 2] = [80, 443];

/// Admission class of a TCP destination port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortClass {
    /// A port the server accepts connections on; inbound SYN-ACK here is
    /// an amplification symptom.
    Listening,
    /// Active-mode FTP data. The server originates these connections, so
    /// an inbound bare SYN is never legitimate. A spoofed packet merely
    /// carrying this port pattern cannot be told apart statelessly; that
    /// is an accepted limit of per-packet classification.
    FtpActiveData,
    /// Not a service port; only server-originated client traffic may
    /// land here.
    Unlisted,
}

/// Look up the admission class of a destination port.
pub fn port_class(dst_port: u16) -> PortClass {
    if dst_port == FTP_DATA_PORT {
        PortClass::FtpActiveData
    } else if LISTENING_PORTS.contains(&dst_port) || FTP_PASSIVE_RANGE.contains(&dst_port) {
        PortClass::Listening
    } else {
        PortClass::Unlisted
    }
}

/// Classify one packet.
///
/// Pure and total: always returns a [`Decision`], never panics, never
/// inspects anything beyond the fields of the view.
pub fn classify(pkt: &PacketView) -> Decision {
    match pkt.l4_proto {
        L4Proto::Icmp => classify_icmp(pkt),
        L4Proto::Icmpv6 => classify_icmpv6(pkt),
        L4Proto::Tcp => classify_tcp(pkt),
        L4Proto::Other => Decision::Decline(DeclineReason::UnsupportedProtocol),
    }
}

fn classify_icmp(pkt: &PacketView) -> Decision {
    if pkt.l3_proto != L3Proto::Ipv4 {
        // ICMP must be on top of IPv4.
        return Decision::Decline(DeclineReason::UnsupportedProtocol);
    }
    if pkt.fragmented {
        return Decision::Decline(DeclineReason::MalformedHeader);
    }
    if pkt.l4_len < icmp::HEADER_SIZE {
        return Decision::Decline(DeclineReason::MalformedHeader);
    }
    if icmp::is_admitted(pkt.icmp_type) {
        // ICMP carries no per-connection budget of its own.
        Decision::NeedSecondary
    } else {
        Decision::Decline(DeclineReason::UnsupportedMessageType)
    }
}

fn classify_icmpv6(pkt: &PacketView) -> Decision {
    if pkt.l3_proto != L3Proto::Ipv6 {
        // ICMPv6 must be on top of IPv6.
        return Decision::Decline(DeclineReason::UnsupportedProtocol);
    }
    if pkt.fragmented {
        return Decision::Decline(DeclineReason::MalformedHeader);
    }
    if pkt.l4_len < icmpv6::HEADER_SIZE {
        return Decision::Decline(DeclineReason::MalformedHeader);
    }
    if icmpv6::is_admitted(pkt.icmpv6_type) {
        Decision::NeedSecondary
    } else {
        Decision::Decline(DeclineReason::UnsupportedMessageType)
    }
}

fn classify_tcp(pkt: &PacketView) -> Decision {
    if pkt.fragmented {
        // No trustworthy header fields; charge to the secondary budget.
        return Decision::NeedSecondary;
    }
    if pkt.l4_len < tcp::MIN_HEADER_SIZE {
        return Decision::Decline(DeclineReason::MalformedHeader);
    }

    let flags = pkt.tcp_flags;
    match port_class(pkt.dst_port) {
        PortClass::Listening => {
            if flags.is_syn_ack() {
                Decision::Decline(DeclineReason::AmplificationSuspect)
            } else {
                Decision::Forward
            }
        }
        PortClass::FtpActiveData => {
            if flags.is_syn_only() {
                Decision::Decline(DeclineReason::UnauthorizedPort)
            } else {
                Decision::Forward
            }
        }
        PortClass::Unlisted => {
            if flags.is_syn_only() {
                return Decision::Decline(DeclineReason::UnauthorizedPort);
            }
            // Server-originated client traffic: the remote peer must be a
            // recognized HTTP/HTTPS service.
            if EGRESS_PEER_PORTS.contains(&pkt.src_port) {
                Decision::Forward
            } else {
                Decision::Decline(DeclineReason::UnauthorizedPort)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::icmp::IcmpType;
    use crate::protocol::icmpv6::Icmpv6Type;
    use crate::protocol::tcp::TcpFlags;

    const SYN: TcpFlags = TcpFlags { syn: true, ack: false };
    const SYN_ACK: TcpFlags = TcpFlags { syn: true, ack: true };
    const ACK: TcpFlags = TcpFlags { syn: false, ack: true };
    const NONE: TcpFlags = TcpFlags { syn: false, ack: false };

    #[test]
    fn test_unsupported_l4_declined() {
        let mut pkt = PacketView::tcp(100, 12345, 80, NONE);
        pkt.l4_proto = L4Proto::Other;
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::UnsupportedProtocol)
        );
    }

    #[test]
    fn test_icmp_echo_request_needs_secondary() {
        let pkt = PacketView::icmp(84, IcmpType::EchoRequest as u8);
        assert_eq!(classify(&pkt), Decision::NeedSecondary);
    }

    #[test]
    fn test_icmp_admitted_set_is_closed() {
        for msg_type in 0..=255u8 {
            let pkt = PacketView::icmp(84, msg_type);
            let expected = if crate::protocol::icmp::is_admitted(msg_type) {
                Decision::NeedSecondary
            } else {
                Decision::Decline(DeclineReason::UnsupportedMessageType)
            };
            assert_eq!(classify(&pkt), expected, "ICMP type {}", msg_type);
        }
    }

    #[test]
    fn test_icmp_redirect_declined() {
        let pkt = PacketView::icmp(84, IcmpType::Redirect as u8);
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::UnsupportedMessageType)
        );
    }

    #[test]
    fn test_icmp_over_ipv6_declined() {
        let mut pkt = PacketView::icmp(84, IcmpType::EchoRequest as u8);
        pkt.l3_proto = L3Proto::Ipv6;
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::UnsupportedProtocol)
        );
    }

    #[test]
    fn test_fragmented_icmp_declined() {
        let pkt = PacketView::icmp(84, IcmpType::EchoRequest as u8).fragment();
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::MalformedHeader)
        );
    }

    #[test]
    fn test_short_icmp_header_declined() {
        let mut pkt = PacketView::icmp(84, IcmpType::EchoRequest as u8);
        pkt.l4_len = crate::protocol::icmp::HEADER_SIZE - 1;
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::MalformedHeader)
        );
    }

    #[test]
    fn test_short_icmpv6_header_declined() {
        let mut pkt = PacketView::icmpv6(104, Icmpv6Type::EchoRequest as u8);
        pkt.l4_len = crate::protocol::icmpv6::HEADER_SIZE - 1;
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::MalformedHeader)
        );
    }

    #[test]
    fn test_icmpv6_admitted_set_is_closed() {
        for msg_type in 0..=255u8 {
            let pkt = PacketView::icmpv6(104, msg_type);
            let expected = if crate::protocol::icmpv6::is_admitted(msg_type) {
                Decision::NeedSecondary
            } else {
                Decision::Decline(DeclineReason::UnsupportedMessageType)
            };
            assert_eq!(classify(&pkt), expected, "ICMPv6 type {}", msg_type);
        }
    }

    #[test]
    fn test_icmpv6_over_ipv4_declined() {
        let mut pkt = PacketView::icmpv6(104, Icmpv6Type::EchoRequest as u8);
        pkt.l3_proto = L3Proto::Ipv4;
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::UnsupportedProtocol)
        );
    }

    #[test]
    fn test_fragmented_icmpv6_declined() {
        let pkt = PacketView::icmpv6(104, Icmpv6Type::EchoReply as u8).fragment();
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::MalformedHeader)
        );
    }

    #[test]
    fn test_fragmented_tcp_needs_secondary_regardless_of_ports() {
        for (src, dst, flags) in [
            (12345, 80, SYN),
            (443, 9999, SYN_ACK),
            (1, 20, NONE),
            (65535, 51500, ACK),
        ] {
            let pkt = PacketView::tcp(1500, src, dst, flags).fragment();
            assert_eq!(classify(&pkt), Decision::NeedSecondary);
        }
    }

    #[test]
    fn test_short_tcp_header_declined() {
        let mut pkt = PacketView::tcp(60, 12345, 80, SYN);
        pkt.l4_len = tcp::MIN_HEADER_SIZE - 1;
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::MalformedHeader)
        );
    }

    #[test]
    fn test_listening_ports_reject_syn_ack_only() {
        for dst in [21, 22, 80, 443, 51000, 51500, 51999] {
            for (flags, expected) in [
                (SYN, Decision::Forward),
                (ACK, Decision::Forward),
                (NONE, Decision::Forward),
                (SYN_ACK, Decision::Decline(DeclineReason::AmplificationSuspect)),
            ] {
                let pkt = PacketView::tcp(60, 12345, dst, flags);
                assert_eq!(classify(&pkt), expected, "dst {} flags {:?}", dst, flags);
            }
        }
    }

    #[test]
    fn test_ftp_active_data_rejects_bare_syn_only() {
        for (flags, expected) in [
            (SYN, Decision::Decline(DeclineReason::UnauthorizedPort)),
            (SYN_ACK, Decision::Forward),
            (ACK, Decision::Forward),
            (NONE, Decision::Forward),
        ] {
            let pkt = PacketView::tcp(60, 12345, 20, flags);
            assert_eq!(classify(&pkt), expected, "flags {:?}", flags);
        }
    }

    #[test]
    fn test_unlisted_port_requires_recognized_peer() {
        // Bare SYN is rejected no matter the source.
        let pkt = PacketView::tcp(60, 80, 9999, SYN);
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::UnauthorizedPort)
        );

        // Otherwise the remote peer must be HTTP or HTTPS.
        for src in [80, 443] {
            let pkt = PacketView::tcp(60, src, 9999, ACK);
            assert_eq!(classify(&pkt), Decision::Forward);
        }
        for src in [0, 22, 8080, 65535] {
            let pkt = PacketView::tcp(60, src, 9999, ACK);
            assert_eq!(
                classify(&pkt),
                Decision::Decline(DeclineReason::UnauthorizedPort)
            );
        }
    }

    /// Sweep the whole destination-port space: every port falls in exactly
    /// one admission class and follows that class's flag rule.
    #[test]
    fn test_port_table_partition() {
        for dst in 0..=65535u16 {
            let class = port_class(dst);
            match dst {
                20 => assert_eq!(class, PortClass::FtpActiveData),
                21 | 22 | 80 | 443 => assert_eq!(class, PortClass::Listening),
                51000..=51999 => assert_eq!(class, PortClass::Listening),
                _ => assert_eq!(class, PortClass::Unlisted),
            }

            let syn_ack = classify(&PacketView::tcp(60, 12345, dst, SYN_ACK));
            let bare_syn = classify(&PacketView::tcp(60, 12345, dst, SYN));
            match class {
                PortClass::Listening => {
                    assert_eq!(
                        syn_ack,
                        Decision::Decline(DeclineReason::AmplificationSuspect)
                    );
                    assert_eq!(bare_syn, Decision::Forward);
                }
                PortClass::FtpActiveData => {
                    assert_eq!(syn_ack, Decision::Forward);
                    assert_eq!(
                        bare_syn,
                        Decision::Decline(DeclineReason::UnauthorizedPort)
                    );
                }
                PortClass::Unlisted => {
                    // Source 12345 is not a recognized peer.
                    assert_eq!(
                        syn_ack,
                        Decision::Decline(DeclineReason::UnauthorizedPort)
                    );
                    assert_eq!(
                        bare_syn,
                        Decision::Decline(DeclineReason::UnauthorizedPort)
                    );
                }
            }
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let views = [
            PacketView::tcp(60, 12345, 443, SYN),
            PacketView::tcp(60, 443, 9999, ACK),
            PacketView::tcp(1500, 1, 2, NONE).fragment(),
            PacketView::icmp(84, IcmpType::EchoRequest as u8),
            PacketView::icmpv6(104, Icmpv6Type::Redirect as u8),
        ];
        for pkt in views {
            assert_eq!(classify(&pkt), classify(&pkt));
        }
    }

    // Reference scenarios.

    #[test]
    fn test_inbound_https_syn_forwarded() {
        let pkt = PacketView::tcp(60, 54321, 443, SYN);
        assert_eq!(classify(&pkt), Decision::Forward);
    }

    #[test]
    fn test_inbound_https_syn_ack_declined() {
        let pkt = PacketView::tcp(60, 54321, 443, SYN_ACK);
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::AmplificationSuspect)
        );
    }

    #[test]
    fn test_inbound_ftp_data_syn_declined() {
        let pkt = PacketView::tcp(60, 54321, 20, SYN);
        assert_eq!(
            classify(&pkt),
            Decision::Decline(DeclineReason::UnauthorizedPort)
        );
    }

    #[test]
    fn test_https_reply_to_client_connection_forwarded() {
        let pkt = PacketView::tcp(1400, 443, 9999, ACK);
        assert_eq!(classify(&pkt), Decision::Forward);
    }
}
