use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::transaction::Transaction;

/// A sealed block. Fields are read-only outside the blockchain module:
/// once appended, a block never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: f64, // seconds since epoch, microsecond resolution
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: String,
}

impl Block {
    pub(super) fn new(
        index: u64,
        timestamp: f64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp,
            transactions,
            proof,
            previous_hash,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn proof(&self) -> u64 {
        self.proof
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    /// Canonical text of the block: keys sorted, no whitespace, timestamp
    /// rendered with exactly six decimals so every node hashes the same bytes.
    pub fn canonical_json(&self) -> String {
        let txs = self
            .transactions
            .iter()
            .map(|tx| {
                format!(
                    r#"{{"amount":{},"recipient":{},"sender":{}}}"#,
                    tx.amount,
                    json_string(&tx.recipient),
                    json_string(&tx.sender)
                )
            })
            .collect::<Vec<_>>()
            .join(",");

        format!(
            r#"{{"index":{},"previous_hash":{},"proof":{},"timestamp":{:.6},"transactions":[{}]}}"#,
            self.index,
            json_string(&self.previous_hash),
            self.proof,
            self.timestamp,
            txs
        )
    }

    /// SHA-256 of the canonical serialization, lowercase hex.
    /// Recomputed on every call.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_json().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Current wall-clock time truncated to whole microseconds.
pub fn current_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Peer timestamps are rounded to whole microseconds so that blocks which
/// hash alike also compare equal.
fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let seconds = f64::deserialize(deserializer)?;
    Ok((seconds * 1_000_000.0).round() / 1_000_000.0)
}

fn json_string(s: &str) -> String {
    Value::from(s).to_string()
}
