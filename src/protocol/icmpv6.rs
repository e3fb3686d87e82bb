//! ICMPv6 protocol - RFC 4443

/// Minimum ICMPv6 message size: the 4-byte header plus the 4-byte message
/// body every RFC 4443 message starts with.
pub const HEADER_SIZE: usize = 8;

/// ICMPv6 message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Icmpv6Type {
    DestinationUnreachable = 1,
    PacketTooBig = 2,
    TimeExceeded = 3,
    ParameterProblem = 4,
    EchoRequest = 128,
    EchoReply = 129,
    RouterSolicitation = 133,
    RouterAdvertisement = 134,
    NeighborSolicitation = 135,
    NeighborAdvertisement = 136,
    Redirect = 137,
}

impl Icmpv6Type {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Icmpv6Type::DestinationUnreachable),
            2 => Some(Icmpv6Type::PacketTooBig),
            3 => Some(Icmpv6Type::TimeExceeded),
            4 => Some(Icmpv6Type::ParameterProblem),
            128 => Some(Icmpv6Type::EchoRequest),
            129 => Some(Icmpv6Type::EchoReply),
            133 => Some(Icmpv6Type::RouterSolicitation),
            134 => Some(Icmpv6Type::RouterAdvertisement),
            135 => Some(Icmpv6Type::NeighborSolicitation),
            136 => Some(Icmpv6Type::NeighborAdvertisement),
            137 => Some(Icmpv6Type::Redirect),
            _ => None,
        }
    }
}

/// Message types the admission policy lets through to the secondary budget.
///
/// Echo traffic and the RFC 4443 error messages. NDP messages (RS/RA/NS/NA,
/// Redirect) are link-local concerns the upstream stack handles; they never
/// reach this policy legitimately and are declined.
pub const ADMITTED_TYPES: [Icmpv6Type; 6] = [
    Icmpv6Type::DestinationUnreachable,
    Icmpv6Type::PacketTooBig,
    Icmpv6Type::TimeExceeded,
    Icmpv6Type::ParameterProblem,
    Icmpv6Type::EchoRequest,
    Icmpv6Type::EchoReply,
];

/// Check whether a raw message type is in the admitted set.
pub fn is_admitted(msg_type: u8) -> bool {
    Icmpv6Type::from_u8(msg_type).is_some_and(|t| ADMITTED_TYPES.contains(&t))
}
