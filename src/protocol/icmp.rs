//! ICMP (Internet Control Message Protocol) - RFC 792

/// ICMP header size (minimum)
pub const HEADER_SIZE: usize = 8;

/// ICMP message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IcmpType {
    EchoReply = 0,
    DestinationUnreachable = 3,
    SourceQuench = 4,
    Redirect = 5,
    EchoRequest = 8,
    TimeExceeded = 11,
    ParameterProblem = 12,
}

impl IcmpType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(IcmpType::EchoReply),
            3 => Some(IcmpType::DestinationUnreachable),
            4 => Some(IcmpType::SourceQuench),
            5 => Some(IcmpType::Redirect),
            8 => Some(IcmpType::EchoRequest),
            11 => Some(IcmpType::TimeExceeded),
            12 => Some(IcmpType::ParameterProblem),
            _ => None,
        }
    }
}

/// Message types the admission policy lets through to the secondary budget.
///
/// Echo traffic plus the error messages a host behind the policy needs for
/// path MTU discovery and unreachable/TTL diagnostics. Everything else,
/// notably Redirect, is declined.
pub const ADMITTED_TYPES: [IcmpType; 5] = [
    IcmpType::EchoReply,
    IcmpType::DestinationUnreachable,
    IcmpType::SourceQuench,
    IcmpType::EchoRequest,
    IcmpType::TimeExceeded,
];

/// Check whether a raw message type is in the admitted set.
pub fn is_admitted(msg_type: u8) -> bool {
    IcmpType::from_u8(msg_type).is_some_and(|t| ADMITTED_TYPES.contains(&t))
}
