use log::debug;

use super::block::current_timestamp;
use super::{Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;

/// In-memory append-only chain plus the pool of transactions waiting
/// for the next block.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Ledger {
    /// Initialize a ledger holding only the genesis block.
    pub fn new() -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
        };
        ledger.seal(GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string());
        ledger
    }

    /// Seal the whole pending pool into a new block on top of the chain.
    ///
    /// `proof` is taken as given; producing a valid one is the caller's job.
    /// `previous_hash` overrides the link to the current tip and only makes
    /// sense for a genesis block.
    pub fn append_block(&mut self, proof: u64, previous_hash: Option<String>) -> Result<&Block> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self.last_block()?.hash(),
        };
        Ok(self.seal(proof, previous_hash))
    }

    fn seal(&mut self, proof: u64, previous_hash: String) -> &Block {
        let block = Block::new(
            self.chain.len() as u64 + 1,
            current_timestamp(),
            std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        );
        debug!(
            "LEDGER - sealed block #{} at {:.6} with {} txs",
            block.index(),
            block.timestamp(),
            block.transactions().len()
        );
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// Queue a transaction; returns the index of the block that will hold it.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<u64> {
        let next_index = self.last_block()?.index() + 1;
        self.pending.push(tx);
        Ok(next_index)
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Swap in a whole new block sequence. The pending pool is kept.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> Result<()> {
        if chain.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        self.chain = chain;
        Ok(())
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
