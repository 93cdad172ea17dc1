//! SNMP-managed power equipment data client (§4.F.3).

pub mod client;
pub mod mib;
pub mod transport;

pub use client::SnmpDataClient;
pub use transport::{CsnmpWalker, SnmpWalker};
