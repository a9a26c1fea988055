pub mod block;
pub mod model;
pub mod pow;
pub mod validate;

pub use block::Block;
pub use model::Ledger;
pub use pow::{CancelFlag, ProofOfWork};
pub use validate::is_valid_chain;

/// Default Proof-of-Work difficulty (number of leading zero hex digits).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Marker stored as the genesis `previous_hash`; never a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Proof recorded in the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// Sender of the block reward transaction.
pub const REWARD_SENDER: &str = "0";

/// Amount credited to the miner for each block.
pub const MINING_REWARD: u64 = 1;

/// How many times `mine` re-solves after the tip moved underneath it.
pub const MAX_MINING_ATTEMPTS: u32 = 3;
