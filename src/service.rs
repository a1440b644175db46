// Watchlist service: owns the per-user lists and answers protocol
// datagrams. `WatchlistService::handle` is pure request-in/reply-out so
// tests can drive it without a socket; `serve` wraps it in the blocking
// UDP loop used by the `watchlistd` binary.

use std::collections::HashMap;
use std::net::UdpSocket;

use log::{debug, info, warn};

use crate::protocol::{self, Request, LIST_NAME, MAX_DATAGRAM};

/// Per-user movie lists. Entries keep insertion order and are
/// de-duplicated on insert, so storing an already-listed movie is a
/// no-op.
#[derive(Debug, Default)]
pub struct WatchlistStore {
    lists: HashMap<u64, Vec<u64>>,
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `movie_id` to `user_id`'s list, creating the list on first
    /// use. Returns whether the entry was newly inserted.
    pub fn add(&mut self, user_id: u64, movie_id: u64) -> bool {
        let list = self.lists.entry(user_id).or_default();
        if list.contains(&movie_id) {
            return false;
        }
        list.push(movie_id);
        true
    }

    /// The user's entries in insertion order, if any have been stored.
    pub fn entries(&self, user_id: u64) -> Option<&[u64]> {
        self.lists.get(&user_id).map(|list| list.as_slice())
    }
}

/// Request dispatcher over a [`WatchlistStore`].
#[derive(Debug, Default)]
pub struct WatchlistService {
    store: WatchlistStore,
}

impl WatchlistService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one request datagram and produce the reply datagram.
    /// Every request gets a reply, including ones that fail to decode;
    /// the client blocks on exactly one response per request.
    pub fn handle(&mut self, datagram: &[u8]) -> Vec<u8> {
        match protocol::decode_request(datagram) {
            Ok(Request::Store(req)) => {
                if req.list != LIST_NAME {
                    warn!("store request for unknown list {:?}", req.list);
                    return protocol::encode_error_ack();
                }
                let inserted = self.store.add(req.user_id, req.movie_id);
                info!(
                    "store: user {} movie {} ({})",
                    req.user_id,
                    req.movie_id,
                    if inserted { "added" } else { "already listed" }
                );
                protocol::encode_ok_ack()
            }
            Ok(Request::Retrieve(req)) => match self.store.entries(req.user_id) {
                Some(ids) if !ids.is_empty() => {
                    debug!("retrieve: user {} has {} entries", req.user_id, ids.len());
                    protocol::encode_entries_response(ids)
                }
                _ => {
                    debug!("retrieve: user {} has no entries", req.user_id);
                    protocol::encode_empty_response()
                }
            },
            Err(e) => {
                warn!("dropping undecodable request: {}", e);
                protocol::encode_error_ack()
            }
        }
    }

    /// Blocking serve loop: one datagram in, one datagram out, forever.
    /// A request's effect on the store is visible before its reply is
    /// sent.
    pub fn serve(&mut self, socket: UdpSocket) -> std::io::Result<()> {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            let (len, peer) = socket.recv_from(&mut buf)?;
            let reply = self.handle(&buf[..len]);
            socket.send_to(&reply, peer)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        decode_response, encode_retrieve_request, encode_store_request, RetrieveResponse,
    };

    #[test]
    fn store_then_retrieve_round_trips() {
        let mut service = WatchlistService::new();
        let ack = service.handle(&encode_store_request(42, 7));
        // Ack content is unspecified wire-wise; it just has to exist.
        assert!(!ack.is_empty());

        let reply = service.handle(&encode_retrieve_request(42));
        assert_eq!(
            decode_response(&reply).unwrap(),
            RetrieveResponse::Entries(vec![7])
        );
    }

    #[test]
    fn retrieve_for_unknown_user_is_empty() {
        let mut service = WatchlistService::new();
        let reply = service.handle(&encode_retrieve_request(99));
        assert_eq!(decode_response(&reply).unwrap(), RetrieveResponse::Empty);
    }

    #[test]
    fn duplicate_store_is_deduplicated() {
        let mut service = WatchlistService::new();
        service.handle(&encode_store_request(1, 55));
        service.handle(&encode_store_request(1, 55));
        let reply = service.handle(&encode_retrieve_request(1));
        assert_eq!(
            decode_response(&reply).unwrap(),
            RetrieveResponse::Entries(vec![55])
        );
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut service = WatchlistService::new();
        for movie in [30, 10, 20] {
            service.handle(&encode_store_request(5, movie));
        }
        let reply = service.handle(&encode_retrieve_request(5));
        assert_eq!(
            decode_response(&reply).unwrap(),
            RetrieveResponse::Entries(vec![30, 10, 20])
        );
    }

    #[test]
    fn users_do_not_share_lists() {
        let mut service = WatchlistService::new();
        service.handle(&encode_store_request(1, 7));
        let reply = service.handle(&encode_retrieve_request(2));
        assert_eq!(decode_response(&reply).unwrap(), RetrieveResponse::Empty);
    }

    #[test]
    fn undecodable_request_still_gets_a_reply() {
        let mut service = WatchlistService::new();
        let reply = service.handle(b"complete garbage");
        assert!(!reply.is_empty());
    }

    #[test]
    fn store_for_unknown_list_does_not_mutate() {
        let mut service = WatchlistService::new();
        let datagram = br#"{"user_ID": 1, "LIST": "SEEN", "movie_ID": 7}"#;
        let reply = service.handle(datagram);
        assert!(!reply.is_empty());
        let reply = service.handle(&encode_retrieve_request(1));
        assert_eq!(decode_response(&reply).unwrap(), RetrieveResponse::Empty);
    }
}
