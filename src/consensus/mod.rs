pub mod registry;
pub mod transport;

pub use registry::PeerRegistry;
pub use transport::{ChainFetcher, HttpChainFetcher, RemoteChain};

use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::RwLock;

use crate::blockchain::{Block, Ledger, ProofOfWork, is_valid_chain};
use crate::error::Result;

/// Longest valid chain wins.
///
/// Every registered peer is asked for its chain concurrently; results are then
/// examined one by one in registration order. A candidate must be strictly
/// longer than both the local chain and the best candidate so far, so on a tie
/// the earliest registered peer wins. Unreachable peers and invalid chains are
/// skipped. Returns `true` when the local chain was replaced; the pending pool
/// is never touched.
pub async fn resolve_conflicts<F: ChainFetcher>(
    ledger: &RwLock<Ledger>,
    peers: &PeerRegistry,
    pow: &ProofOfWork,
    fetcher: &F,
) -> Result<bool> {
    let authorities = peers.peers();
    let local_length = ledger.read().expect("ledger lock poisoned").len();

    let fetched = join_all(authorities.iter().map(|a| fetcher.fetch_chain(a))).await;

    let mut max_length = local_length;
    let mut best: Option<(&str, Vec<Block>)> = None;

    for (authority, result) in authorities.iter().zip(fetched) {
        let remote = match result {
            Ok(remote) => remote,
            Err(e) => {
                warn!("CONSENSUS - skipping peer: {e}");
                continue;
            }
        };

        if remote.length <= max_length {
            debug!(
                "CONSENSUS - {authority} has {} blocks, need more than {max_length}",
                remote.length
            );
            continue;
        }

        if !is_valid_chain(&remote.chain, pow) {
            warn!(
                "CONSENSUS - {authority} sent an invalid chain of {} blocks",
                remote.length
            );
            continue;
        }

        max_length = remote.length;
        best = Some((authority.as_str(), remote.chain));
    }

    let Some((winner, chain)) = best else {
        info!("CONSENSUS - local chain of {local_length} blocks is authoritative");
        return Ok(false);
    };

    let mut ledger = ledger.write().expect("ledger lock poisoned");
    if chain.len() <= ledger.len() {
        // Local mining caught up while peers were being queried.
        info!(
            "CONSENSUS - candidate from {winner} no longer longer than local chain ({} blocks)",
            ledger.len()
        );
        return Ok(false);
    }

    info!(
        "CONSENSUS - replacing local chain ({} blocks) with {winner}'s ({} blocks)",
        ledger.len(),
        chain.len()
    );
    ledger.replace_chain(chain)?;
    Ok(true)
}
