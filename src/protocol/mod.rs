//! Protocol constants for the admission policy
//!
//! Message-type enums, minimum header sizes, and the admitted-type sets
//! for the protocols the policy recognizes.

pub mod icmp;
pub mod icmpv6;
pub mod tcp;
