use actix_web::{HttpResponse, get, post, web};
use log::debug;

use super::models::{MessageResponse, PendingResponse};
use crate::error::LedgerError;
use crate::node::AppState;
use crate::transaction::TransactionRequest;

/// Queue a transaction for the next block. All of sender, recipient and amount are required.
#[post("/transactions/new/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<TransactionRequest>,
) -> Result<HttpResponse, LedgerError> {
    debug!("POST /transactions/new/ - {:?}", body);
    let index = state.submit_transaction(body.into_inner())?;
    Ok(HttpResponse::Created().json(MessageResponse {
        message: format!("Transaction will be added to Block {index}"),
    }))
}

/// List the pending pool.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> HttpResponse {
    let transactions = state.pending_snapshot();
    HttpResponse::Ok().json(PendingResponse {
        size: transactions.len(),
        transactions,
    })
}
