//! Webgate - per-packet admission control
//!
//! A bounded-time decision engine guarding a web server host that runs
//! HTTP, HTTPS, SSH, and FTP (active and passive modes). Every inbound or
//! outbound packet is checked against a primary byte-rate budget, then a
//! fixed protocol admission policy, and fragmented or ICMP/ICMPv6 traffic
//! is additionally charged to a stricter secondary budget.

pub mod config;
pub mod error;
pub mod packet;
pub mod pipeline;
pub mod policy;
pub mod protocol;
pub mod rate;
pub mod telemetry;

pub use error::{Error, Result};
pub use packet::{L3Proto, L4Proto, PacketView};
pub use pipeline::Pipeline;
pub use policy::{Decision, DeclineReason, classify};
pub use rate::{BudgetGates, GateVerdict, RateState, TokenBucketGates};
