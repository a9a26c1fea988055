use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// A value transfer waiting in the pending pool or sealed in a block.
/// No signatures and no balance checks: fields are taken as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    /// Whole non-negative units only. Fractional or negative amounts fail to
    /// decode: a client gets a 400 from the JSON extractor, and a peer chain
    /// holding one is skipped as malformed.
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

/// Incoming submission where every field may be absent.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<u64>,
}

impl TransactionRequest {
    /// Require all three fields, reporting the first one missing.
    pub fn into_transaction(self) -> Result<Transaction> {
        let sender = self.sender.ok_or(LedgerError::MissingField("sender"))?;
        let recipient = self
            .recipient
            .ok_or(LedgerError::MissingField("recipient"))?;
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        Ok(Transaction::new(sender, recipient, amount))
    }
}
