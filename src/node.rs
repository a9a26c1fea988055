use log::{info, warn};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::blockchain::{
    Block, CancelFlag, Ledger, MAX_MINING_ATTEMPTS, MINING_REWARD, ProofOfWork, REWARD_SENDER,
    is_valid_chain,
};
use crate::consensus::{self, HttpChainFetcher, PeerRegistry};
use crate::error::{LedgerError, Result};
use crate::transaction::{Transaction, TransactionRequest};

/// Node state shared by all request handlers.
///
/// Chain and pending pool live behind one lock; peers have their own.
/// Proof-of-work always runs with no lock held.
pub struct AppState {
    ledger: RwLock<Ledger>,
    peers: PeerRegistry,
    pow: ProofOfWork,
    node_id: String,
    fetcher: HttpChainFetcher,
    shutdown: CancelFlag,
}

impl AppState {
    pub fn new(node_id: String, pow: ProofOfWork, fetcher: HttpChainFetcher) -> Self {
        Self {
            ledger: RwLock::new(Ledger::new()),
            peers: PeerRegistry::new(),
            pow,
            node_id,
            fetcher,
            shutdown: CancelFlag::new(),
        }
    }

    fn ledger(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().expect("ledger lock poisoned")
    }

    fn ledger_mut(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().expect("ledger lock poisoned")
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Flag raised on shutdown to abort in-flight mining.
    pub fn shutdown_flag(&self) -> CancelFlag {
        self.shutdown.clone()
    }

    /// Solve the puzzle against the current tip, credit the reward and seal
    /// a block. The tip is re-checked before committing; if another block
    /// landed in the meantime the search restarts, at most
    /// `MAX_MINING_ATTEMPTS` times.
    pub fn mine(&self) -> Result<Block> {
        self.mine_with(|last_proof| self.pow.solve(last_proof, &self.shutdown))
    }

    /// Attempt loop behind `mine`; `solve` runs with no lock held.
    fn mine_with<S>(&self, mut solve: S) -> Result<Block>
    where
        S: FnMut(u64) -> Result<u64>,
    {
        for attempt in 1..=MAX_MINING_ATTEMPTS {
            let (last_proof, tip_hash) = {
                let ledger = self.ledger();
                let tip = ledger.last_block()?;
                (tip.proof(), tip.hash())
            };

            let proof = solve(last_proof)?;

            if let Some(block) = self.commit_mined(proof, &tip_hash)? {
                info!(
                    "MINER - forged block #{} (proof={}, txs={})",
                    block.index(),
                    block.proof(),
                    block.transactions().len()
                );
                return Ok(block);
            }
            warn!("MINER - tip moved during attempt {attempt}, solving again");
        }
        Err(LedgerError::StaleTip {
            attempts: MAX_MINING_ATTEMPTS,
        })
    }

    /// Append the reward and a block with `proof` if the tip still hashes to
    /// `tip_hash`. Returns `None` when the proof went stale.
    fn commit_mined(&self, proof: u64, tip_hash: &str) -> Result<Option<Block>> {
        let mut ledger = self.ledger_mut();
        if ledger.last_block()?.hash() != tip_hash {
            return Ok(None);
        }
        ledger.submit_transaction(Transaction::new(
            REWARD_SENDER,
            self.node_id.as_str(),
            MINING_REWARD,
        ))?;
        let block = ledger.append_block(proof, None)?.clone();
        Ok(Some(block))
    }

    /// Validate a submission and queue it; returns the target block index.
    pub fn submit_transaction(&self, req: TransactionRequest) -> Result<u64> {
        let tx = req.into_transaction()?;
        let index = self.ledger_mut().submit_transaction(tx)?;
        info!("TX - queued for block #{index}");
        Ok(index)
    }

    pub fn chain_snapshot(&self) -> Vec<Block> {
        self.ledger().chain().to_vec()
    }

    pub fn pending_snapshot(&self) -> Vec<Transaction> {
        self.ledger().pending().to_vec()
    }

    /// Whether our own chain passes the validator, with its length,
    /// both read under one lock.
    pub fn chain_status(&self) -> (bool, usize) {
        let ledger = self.ledger();
        (is_valid_chain(ledger.chain(), &self.pow), ledger.len())
    }

    pub fn register_peer(&self, address: &str) -> Result<String> {
        self.peers.register(address)
    }

    /// Register several addresses; nothing is stored if any of them is invalid.
    pub fn register_peers(&self, addresses: &[String]) -> Result<usize> {
        let authorities = addresses
            .iter()
            .map(|a| consensus::registry::parse_authority(a))
            .collect::<Result<Vec<_>>>()?;
        for authority in &authorities {
            self.peers.register(authority)?;
        }
        Ok(self.peers.len())
    }

    pub fn peers(&self) -> Vec<String> {
        self.peers.peers()
    }

    pub async fn resolve_conflicts(&self) -> Result<bool> {
        consensus::resolve_conflicts(&self.ledger, &self.peers, &self.pow, &self.fetcher).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> AppState {
        let fetcher = HttpChainFetcher::new(Duration::from_millis(200)).unwrap();
        AppState::new("node-1".into(), ProofOfWork::new(2), fetcher)
    }

    fn request(sender: &str, recipient: &str, amount: u64) -> TransactionRequest {
        TransactionRequest {
            sender: Some(sender.into()),
            recipient: Some(recipient.into()),
            amount: Some(amount),
        }
    }

    #[test]
    fn submit_then_mine_seals_transaction_and_reward() {
        let state = state();
        let genesis = state.chain_snapshot()[0].clone();

        assert_eq!(state.submit_transaction(request("A", "B", 5)).unwrap(), 2);
        let block = state.mine().unwrap();

        let chain = state.chain_snapshot();
        assert_eq!(chain.len(), 2);
        assert_eq!(block.index(), 2);
        assert_eq!(
            block.transactions(),
            &[
                Transaction::new("A", "B", 5),
                Transaction::new(REWARD_SENDER, "node-1", MINING_REWARD),
            ]
        );
        assert_eq!(block.previous_hash(), genesis.hash());
        assert!(state.pending_snapshot().is_empty());
        assert_eq!(state.chain_status(), (true, 2));
    }

    #[test]
    fn submission_with_missing_field_is_rejected() {
        let state = state();
        let req = TransactionRequest {
            sender: Some("A".into()),
            recipient: None,
            amount: Some(1),
        };
        assert!(matches!(
            state.submit_transaction(req),
            Err(LedgerError::MissingField("recipient"))
        ));
        assert!(state.pending_snapshot().is_empty());
    }

    #[test]
    fn stale_proof_is_not_committed() {
        let state = state();
        let stale_tip = state.chain_snapshot()[0].hash();
        state.mine().unwrap();

        assert!(state.commit_mined(0, &stale_tip).unwrap().is_none());
        assert_eq!(state.chain_snapshot().len(), 2);
    }

    #[test]
    fn moved_tip_triggers_a_new_search() {
        let state = state();
        let mut calls = 0;
        let block = state
            .mine_with(|last_proof| {
                calls += 1;
                if calls == 1 {
                    // Another block lands while this search runs.
                    state.ledger_mut().append_block(0, None).unwrap();
                }
                state.pow.solve(last_proof, &CancelFlag::new())
            })
            .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(block.index(), 3);
        let chain = state.chain_snapshot();
        assert_eq!(block.previous_hash(), chain[1].hash());
        assert!(state.pow.is_valid(chain[1].proof(), block.proof()));
    }

    #[test]
    fn tip_moving_every_attempt_gives_stale_tip() {
        let state = state();
        let mut calls = 0;
        let result = state.mine_with(|last_proof| {
            calls += 1;
            state.ledger_mut().append_block(0, None).unwrap();
            state.pow.solve(last_proof, &CancelFlag::new())
        });

        assert!(matches!(
            result,
            Err(LedgerError::StaleTip {
                attempts: MAX_MINING_ATTEMPTS
            })
        ));
        assert_eq!(calls, MAX_MINING_ATTEMPTS);
        // Only the interfering blocks were added; no reward was queued.
        assert_eq!(state.chain_snapshot().len(), 1 + MAX_MINING_ATTEMPTS as usize);
        assert!(state.pending_snapshot().is_empty());
    }

    #[test]
    fn mining_aborts_on_shutdown() {
        let state = state();
        state.shutdown_flag().cancel();
        assert!(matches!(state.mine(), Err(LedgerError::MiningAborted)));
        assert_eq!(state.chain_snapshot().len(), 1);
    }

    #[test]
    fn peers_register_all_or_nothing() {
        let state = state();
        let bad = vec!["10.0.0.5:5000".to_string(), "http://".to_string()];
        assert!(state.register_peers(&bad).is_err());
        assert!(state.peers().is_empty());

        let good = vec![
            "http://10.0.0.5:5000/x".to_string(),
            "10.0.0.5:5000".to_string(),
            "10.0.0.6:5000".to_string(),
        ];
        assert_eq!(state.register_peers(&good).unwrap(), 2);
        assert_eq!(state.peers(), vec!["10.0.0.5:5000", "10.0.0.6:5000"]);
    }

    #[actix_web::test]
    async fn resolve_without_peers_keeps_chain() {
        let state = state();
        state.mine().unwrap();
        assert!(!state.resolve_conflicts().await.unwrap());
        assert_eq!(state.chain_snapshot().len(), 2);
    }
}
