// Watchlist client: drives the datagram exchange with the watchlist
// service. Each call is one request out, one reply in, over a socket
// opened for just that call, with a bounded wait so a dead service
// surfaces as an error instead of hanging the session.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;

use crate::protocol::{self, RetrieveResponse, WatchlistError, MAX_DATAGRAM};

/// Endpoint used when `WATCHLIST_ADDR` is not set. Matches the port the
/// original microservice listened on.
pub const DEFAULT_SERVICE_ADDR: &str = "127.0.0.1:12345";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The watchlist service address from the environment variable
/// `WATCHLIST_ADDR`, or the default endpoint. Shared by the client and
/// the `watchlistd` binary.
pub fn service_addr_from_env() -> String {
    std::env::var("WATCHLIST_ADDR").unwrap_or_else(|_| DEFAULT_SERVICE_ADDR.into())
}

/// Client for the watchlist service. Holds only the fixed endpoint and
/// the per-call receive bound; there is no connection state to corrupt
/// between calls.
#[derive(Debug, Clone)]
pub struct WatchlistClient {
    server: SocketAddr,
    timeout: Duration,
}

impl WatchlistClient {
    pub fn new(server: SocketAddr, timeout: Duration) -> Self {
        WatchlistClient { server, timeout }
    }

    /// Create a client configured from `WATCHLIST_ADDR` or the default
    /// endpoint, with the standard receive bound.
    pub fn from_env() -> Result<Self> {
        let addr = service_addr_from_env();
        let server = addr
            .parse()
            .with_context(|| format!("invalid watchlist service address {:?}", addr))?;
        Ok(WatchlistClient::new(server, DEFAULT_TIMEOUT))
    }

    /// Save `movie_id` to `user_id`'s list. The reply datagram is
    /// received and discarded: receipt alone acknowledges the store.
    pub fn store(&self, user_id: u64, movie_id: u64) -> Result<(), WatchlistError> {
        let request = protocol::encode_store_request(user_id, movie_id);
        self.exchange(&request)?;
        debug!("stored movie {} for user {}", movie_id, user_id);
        Ok(())
    }

    /// Fetch `user_id`'s list. An empty reply decodes to an empty
    /// sequence, never an error.
    pub fn retrieve(&self, user_id: u64) -> Result<Vec<u64>, WatchlistError> {
        let request = protocol::encode_retrieve_request(user_id);
        let reply = self.exchange(&request)?;
        match protocol::decode_response(&reply)? {
            RetrieveResponse::Empty => Ok(Vec::new()),
            RetrieveResponse::Entries(ids) => Ok(ids),
        }
    }

    /// One request/response round trip. The socket lives only for the
    /// duration of this call and is released on every exit path when it
    /// drops.
    fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, WatchlistError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_read_timeout(Some(self.timeout))?;
        socket.send_to(request, self.server)?;

        let mut buf = [0u8; MAX_DATAGRAM];
        match socket.recv_from(&mut buf) {
            Ok((len, _peer)) => Ok(buf[..len].to_vec()),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Err(WatchlistError::ServiceUnavailable(self.timeout.as_millis()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
