use actix_web::{HttpResponse, get, post, web};

use super::models::{NodesResponse, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse};
use crate::error::LedgerError;
use crate::node::AppState;

#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, LedgerError> {
    let nodes = body
        .into_inner()
        .nodes
        .filter(|n| !n.is_empty())
        .ok_or(LedgerError::MissingField("nodes"))?;
    state.register_peers(&nodes)?;
    Ok(HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added",
        total_nodes: state.peers(),
    }))
}

#[get("/nodes/")]
pub async fn get_nodes(state: web::Data<AppState>) -> HttpResponse {
    let nodes = state.peers();
    HttpResponse::Ok().json(NodesResponse {
        size: nodes.len(),
        nodes,
    })
}

/// Run the longest-chain consensus round against all registered peers.
#[get("/nodes/resolve/")]
pub async fn resolve_nodes(state: web::Data<AppState>) -> Result<HttpResponse, LedgerError> {
    let replaced = state.resolve_conflicts().await?;
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    Ok(HttpResponse::Ok().json(ResolveResponse {
        message,
        replaced,
        chain: state.chain_snapshot(),
    }))
}
