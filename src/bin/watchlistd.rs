// Watchlist daemon: binds the service endpoint and answers protocol
// datagrams until killed. List state lives for the lifetime of the
// process.

use std::net::UdpSocket;

use anyhow::Context;
use log::info;

use topmovie_cli::service::WatchlistService;
use topmovie_cli::watchlist::service_addr_from_env;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let addr = service_addr_from_env();
    let socket = UdpSocket::bind(&addr)
        .with_context(|| format!("binding watchlist service to {}", addr))?;
    info!("watchlist service listening on {}", addr);

    let mut service = WatchlistService::new();
    service.serve(socket).context("watchlist serve loop failed")?;
    Ok(())
}
