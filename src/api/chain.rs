use actix_web::{HttpResponse, get, web};
use log::debug;

use super::models::{MineResponse, ValidateResponse};
use crate::consensus::RemoteChain;
use crate::error::LedgerError;
use crate::node::AppState;

/// Get the full chain. Peers fetch this during conflict resolution.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(RemoteChain::from(state.chain_snapshot()))
}

/// Validate our own chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> HttpResponse {
    let (valid, length) = state.chain_status();
    HttpResponse::Ok().json(ValidateResponse { valid, length })
}

/// Mine a new block:
/// - Solve PoW against the current tip (blocking pool, no lock held)
/// - Credit the mining reward to this node
/// - Seal the pending pool into the block
#[get("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse, LedgerError> {
    debug!("GET /mine/ - node {}", state.node_id());
    let node = state.clone();
    let block = web::block(move || node.mine())
        .await
        .map_err(|e| LedgerError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(MineResponse::from(block)))
}
