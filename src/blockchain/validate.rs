use log::debug;

use super::{Block, ProofOfWork};

/// Check linkage and proofs of an arbitrary chain.
///
/// Every adjacent pair must satisfy `curr.previous_hash == hash(prev)` and
/// `pow.is_valid(prev.proof, curr.proof)`. The first block is taken as is:
/// it is not compared against our own genesis.
pub fn is_valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    for pair in chain.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        if curr.previous_hash() != prev.hash() {
            debug!("VALIDATE - block #{} breaks hash linkage", curr.index());
            return false;
        }

        if !pow.is_valid(prev.proof(), curr.proof()) {
            debug!("VALIDATE - block #{} has an invalid proof", curr.index());
            return false;
        }
    }
    true
}
