mod api;
mod blockchain;
mod config;
mod consensus;
mod error;
mod node;
mod transaction;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{info, warn};

use blockchain::ProofOfWork;
use config::Config;
use consensus::HttpChainFetcher;
use node::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    let (host, port) = (config.host.clone(), config.port);

    println!("⛓️ Starting ledger node {} at http://{host}:{port}", config.node_id);
    info!(
        "difficulty={} peer_timeout={:?}",
        config.difficulty, config.peer_timeout
    );

    let fetcher = HttpChainFetcher::new(config.peer_timeout).map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState::new(
        config.node_id,
        ProofOfWork::new(config.difficulty),
        fetcher,
    ));

    for peer in &config.peers {
        if let Err(e) = state.register_peer(peer) {
            warn!("ignoring configured peer {peer:?}: {e}");
        }
    }

    let shutdown = state.shutdown_flag();
    let on_signal = shutdown.clone();
    actix_web::rt::spawn(async move {
        if actix_web::rt::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    // Stop any mining still running on the blocking pool.
    shutdown.cancel();
    server
}
