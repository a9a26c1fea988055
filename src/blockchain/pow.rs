use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{LedgerError, Result};

/// Shared flag used to abort a running proof-of-work search.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Proof-of-Work puzzle: find `proof` such that
/// sha256("{last_proof}{proof}") starts with `difficulty` zero hex digits.
#[derive(Debug, Clone, Copy)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    /// Exhaustive search from 0 upward; returns the smallest valid proof,
    /// or `MiningAborted` once `cancel` is raised.
    pub fn solve(&self, last_proof: u64, cancel: &CancelFlag) -> Result<u64> {
        let mut proof = 0u64;
        loop {
            if cancel.is_cancelled() {
                return Err(LedgerError::MiningAborted);
            }
            if self.is_valid(last_proof, proof) {
                return Ok(proof);
            }
            proof += 1;
        }
    }

    pub fn is_valid(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{last_proof}{proof}");
        let digest = hex::encode(Sha256::digest(guess.as_bytes()));
        digest
            .chars()
            .take(self.difficulty as usize)
            .all(|c| c == '0')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_difficulty_from_genesis_proof() {
        let pow = ProofOfWork::new(4);
        let proof = pow.solve(100, &CancelFlag::new()).unwrap();
        assert_eq!(proof, 35293);
        assert!(pow.is_valid(100, proof));
    }

    #[test]
    fn solve_returns_smallest_valid_proof() {
        let pow = ProofOfWork::new(2);
        for last_proof in [0u64, 7, 100, 35293] {
            let proof = pow.solve(last_proof, &CancelFlag::new()).unwrap();
            assert!(pow.is_valid(last_proof, proof));
            assert!((0..proof).all(|p| !pow.is_valid(last_proof, p)));
        }
    }

    #[test]
    fn zero_difficulty_accepts_anything() {
        let pow = ProofOfWork::new(0);
        assert!(pow.is_valid(1, 1));
        assert_eq!(pow.solve(42, &CancelFlag::new()).unwrap(), 0);
    }

    #[test]
    fn cancelled_search_aborts() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        // 64 zero digits is unreachable; only the flag ends this search.
        let pow = ProofOfWork::new(64);
        assert!(matches!(
            pow.solve(100, &cancel),
            Err(LedgerError::MiningAborted)
        ));
    }
}
