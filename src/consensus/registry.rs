use log::info;
use std::sync::RwLock;
use url::Url;

use crate::error::{LedgerError, Result};

/// Known peer authorities (`host:port`), unique, kept in registration order.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<Vec<String>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer by address; scheme and path are dropped.
    /// Returns the stored authority. Registering twice is a no-op.
    pub fn register(&self, address: &str) -> Result<String> {
        let authority = parse_authority(address)?;
        let mut peers = self.peers.write().expect("peer lock poisoned");
        if !peers.contains(&authority) {
            info!("PEERS - registered {authority}");
            peers.push(authority.clone());
        }
        Ok(authority)
    }

    /// Snapshot of the registered authorities.
    pub fn peers(&self) -> Vec<String> {
        self.peers.read().expect("peer lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.peers.read().expect("peer lock poisoned").len()
    }
}

/// Extract `host[:port]` from `http://host:port/path` or a bare `host:port`.
pub fn parse_authority(address: &str) -> Result<String> {
    let address = address.trim();
    let candidate = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| LedgerError::InvalidPeerAddress(format!("{address}: {e}")))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| LedgerError::InvalidPeerAddress(address.to_string()))?;

    // `Url::port` hides a scheme's default port; keep it when it was written out.
    let port = url
        .port()
        .or_else(|| {
            has_explicit_port(&candidate)
                .then(|| url.port_or_known_default())
                .flatten()
        });

    Ok(match port {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn has_explicit_port(url: &str) -> bool {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    authority
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_and_path_are_dropped() {
        assert_eq!(
            parse_authority("http://10.0.0.5:5000/x").unwrap(),
            "10.0.0.5:5000"
        );
        assert_eq!(parse_authority("10.0.0.5:5000").unwrap(), "10.0.0.5:5000");
        assert_eq!(
            parse_authority("localhost:5001").unwrap(),
            "localhost:5001"
        );
        assert_eq!(
            parse_authority("https://node.example.org/chain").unwrap(),
            "node.example.org"
        );
    }

    #[test]
    fn written_default_port_is_kept() {
        assert_eq!(parse_authority("https://h:443/x").unwrap(), "h:443");
        assert_eq!(
            parse_authority("http://10.0.0.5:80").unwrap(),
            "10.0.0.5:80"
        );
        assert_eq!(parse_authority("10.0.0.5:80/chain").unwrap(), "10.0.0.5:80");
        assert_eq!(parse_authority("http://[::1]:80/").unwrap(), "[::1]:80");
        assert_eq!(parse_authority("http://[::1]/").unwrap(), "[::1]");
    }

    #[test]
    fn address_without_host_is_rejected() {
        assert!(matches!(
            parse_authority("http://"),
            Err(LedgerError::InvalidPeerAddress(_))
        ));
        assert!(parse_authority("").is_err());
    }

    #[test]
    fn registration_is_deduplicated() {
        let registry = PeerRegistry::new();
        registry.register("http://10.0.0.5:5000/x").unwrap();
        registry.register("10.0.0.5:5000").unwrap();
        assert_eq!(registry.peers(), vec!["10.0.0.5:5000".to_string()]);
    }

    #[test]
    fn keeps_registration_order() {
        let registry = PeerRegistry::new();
        for addr in ["b:1", "a:2", "c:3", "a:2"] {
            registry.register(addr).unwrap();
        }
        assert_eq!(registry.peers(), vec!["b:1", "a:2", "c:3"]);
    }
}
