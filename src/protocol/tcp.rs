//! TCP protocol - RFC 793

/// Minimum TCP header size (without options)
pub const MIN_HEADER_SIZE: usize = 20;

/// TCP flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
}

impl TcpFlags {
    /// Parse SYN/ACK from the flags byte of a TCP header
    pub fn from_byte(byte: u8) -> Self {
        Self {
            syn: (byte & 0x02) != 0,
            ack: (byte & 0x10) != 0,
        }
    }

    pub fn new(syn: bool, ack: bool) -> Self {
        Self { syn, ack }
    }

    /// Check if this is a connection establishment (SYN without ACK)
    pub fn is_syn_only(&self) -> bool {
        self.syn && !self.ack
    }

    /// Check if this is a SYN-ACK
    pub fn is_syn_ack(&self) -> bool {
        self.syn && self.ack
    }
}
