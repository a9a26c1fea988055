use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::blockchain::DEFAULT_DIFFICULTY;

/// Runtime settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    pub node_id: String,
    pub peers: Vec<String>,
    pub peer_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("PORT", 8080u16);
        let difficulty = parse_or("DIFFICULTY", DEFAULT_DIFFICULTY);
        let node_id = env::var("NODE_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        let peers = env::var("PEERS")
            .map(|raw| split_peers(&raw))
            .unwrap_or_default();
        let peer_timeout = Duration::from_secs(parse_or("PEER_TIMEOUT_SECS", 5u64));

        Self {
            host,
            port,
            difficulty,
            node_id,
            peers,
            peer_timeout,
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("CONFIG - invalid {key}={raw:?}, using {default}");
            default
        }),
        Err(_) => default,
    }
}

fn split_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}
