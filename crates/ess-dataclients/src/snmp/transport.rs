//! SNMP walk abstraction (§4.F.3). The `csnmp` crate does the actual
//! network I/O; this module is the one place that touches its API, so the
//! MIB dispatch logic in `client.rs` can be exercised against a mock
//! without a live SNMP agent.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use csnmp::{ObjectIdentifier, Snmp2cClient};

use crate::error::DataClientError;

/// Walks a MIB subtree and returns every leaf's OID (dotted string) mapped
/// to its value, stringified the way the original's `prettyPrint()` would
/// (§4.F.3 step 2: "collect OID->string map").
#[async_trait]
pub trait SnmpWalker: Send + Sync {
    async fn walk(&self, root_oid: &str) -> Result<BTreeMap<String, String>, DataClientError>;
}

/// SNMPv2c walker backed by `csnmp`. SNMP I/O is inherently blocking from
/// the cooperative scheduler's point of view (§4.F.3: "it runs on a worker
/// executor so it does not block the cooperative reader loop"); `csnmp`'s
/// client is itself async, so here that just means every call already goes
/// through tokio's I/O driver rather than a blocking-pool `spawn_blocking`.
pub struct CsnmpWalker {
    addr: SocketAddr,
    community: String,
    timeout: Duration,
}

impl CsnmpWalker {
    pub fn new(addr: SocketAddr, community: impl Into<String>, timeout: Duration) -> Self {
        Self { addr, community, timeout }
    }
}

#[async_trait]
impl SnmpWalker for CsnmpWalker {
    async fn walk(&self, root_oid: &str) -> Result<BTreeMap<String, String>, DataClientError> {
        let root: ObjectIdentifier =
            root_oid.parse().map_err(|_| DataClientError::Protocol(format!("invalid OID: {root_oid}")))?;

        let client = tokio::time::timeout(
            self.timeout,
            Snmp2cClient::new(self.addr, self.community.clone().into_bytes(), None, 0),
        )
        .await
        .map_err(|_| DataClientError::Timeout)?
        .map_err(|e| DataClientError::Protocol(format!("snmp client setup failed: {e}")))?;

        let entries = tokio::time::timeout(self.timeout, client.walk(root))
            .await
            .map_err(|_| DataClientError::Timeout)?
            .map_err(|e| DataClientError::Protocol(format!("snmp walk failed: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|(oid, value)| (oid.to_string(), format!("{value}")))
            .collect())
    }
}

/// Parses the hex-ASCII-float fallback SNMP sometimes returns in place of a
/// direct decimal literal (§4.F.3 step 3, §11 item 3): strip a leading
/// `0x`, hex-decode the rest into bytes, interpret those bytes as an ASCII
/// string, and parse that as a decimal float.
pub fn parse_hex_ascii_float(raw: &str) -> Option<f64> {
    let hex = raw.strip_prefix("0x")?;
    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    let chars: Vec<char> = hex.chars().collect();
    for pair in chars.chunks(2) {
        let byte_str: String = pair.iter().collect();
        bytes.push(u8::from_str_radix(&byte_str, 16).ok()?);
    }
    let decoded = String::from_utf8(bytes).ok()?;
    f64::from_str(decoded.trim()).ok()
}
