// Watchlist wire protocol: the JSON message shapes exchanged between the
// CLI and the watchlist service, one datagram per message. Both sides of
// the exchange live here so the request and response codecs stay in sync:
// the client encodes requests and decodes retrieve responses, the service
// decodes requests and encodes responses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the only list the protocol knows about.
pub const LIST_NAME: &str = "WATCH";

/// Upper bound on a single protocol datagram, requests and replies alike.
pub const MAX_DATAGRAM: usize = 4096;

/// Errors a watchlist exchange can surface to the caller. Transport and
/// decode failures are local to a single call and never leave partial
/// state behind.
#[derive(Debug, Error)]
pub enum WatchlistError {
    /// The reply datagram matched neither recognized response shape.
    #[error("malformed response from watchlist service: {0}")]
    MalformedResponse(String),
    /// A request datagram the service could not decode.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// No reply datagram arrived within the configured wait.
    #[error("watchlist service did not respond within {0} ms")]
    ServiceUnavailable(u128),
    /// Socket-level failure while sending or receiving.
    #[error("watchlist transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Request to add one movie to a user's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRequest {
    #[serde(rename = "user_ID")]
    pub user_id: u64,
    #[serde(rename = "LIST")]
    pub list: String,
    #[serde(rename = "movie_ID")]
    pub movie_id: u64,
}

/// Request for the full contents of a user's list.
///
/// `deny_unknown_fields` keeps the untagged [`Request`] decode from
/// mistaking a store payload for a retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrieveRequest {
    #[serde(rename = "user_ID")]
    pub user_id: u64,
}

/// A decoded request datagram, as seen by the service. Store is tried
/// first because it carries the larger field set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Request {
    Store(StoreRequest),
    Retrieve(RetrieveRequest),
}

/// A decoded retrieve reply: either the user has no entries, or an
/// ordered sequence of movie ids. The codec never deduplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrieveResponse {
    Empty,
    Entries(Vec<u64>),
}

/// Non-empty retrieve reply body.
#[derive(Serialize, Deserialize)]
struct EntriesReply {
    #[serde(rename = "WATCH")]
    watch: Vec<u64>,
}

/// Status-only reply body, used for store acknowledgements and the
/// explicit empty-list tag.
#[derive(Serialize, Deserialize)]
struct StatusReply {
    status: String,
}

const STATUS_OK: &str = "OK";
const STATUS_EMPTY: &str = "EMPTY";
const STATUS_ERROR: &str = "ERROR";

/// Serialize a store request for `movie_id` on behalf of `user_id`.
/// Ids are passed through unvalidated; plausibility is the caller's
/// concern.
pub fn encode_store_request(user_id: u64, movie_id: u64) -> Vec<u8> {
    let request = StoreRequest {
        user_id,
        list: LIST_NAME.to_string(),
        movie_id,
    };
    serde_json::to_vec(&request).expect("store request serializes")
}

/// Serialize a retrieve request for `user_id`.
pub fn encode_retrieve_request(user_id: u64) -> Vec<u8> {
    serde_json::to_vec(&RetrieveRequest { user_id }).expect("retrieve request serializes")
}

/// Parse an incoming request datagram. Service-side counterpart of the
/// two encoders above.
pub fn decode_request(payload: &[u8]) -> Result<Request, WatchlistError> {
    serde_json::from_slice(payload)
        .map_err(|e| WatchlistError::MalformedRequest(e.to_string()))
}

/// Serialize the acknowledgement sent for a handled store request.
pub fn encode_ok_ack() -> Vec<u8> {
    encode_status(STATUS_OK)
}

/// Serialize the reply for a request the service could not decode. Some
/// datagram must always go back so the client's one-in/one-out pairing
/// holds.
pub fn encode_error_ack() -> Vec<u8> {
    encode_status(STATUS_ERROR)
}

/// Serialize the explicit empty-list reply.
pub fn encode_empty_response() -> Vec<u8> {
    encode_status(STATUS_EMPTY)
}

fn encode_status(status: &str) -> Vec<u8> {
    let reply = StatusReply {
        status: status.to_string(),
    };
    serde_json::to_vec(&reply).expect("status reply serializes")
}

/// Serialize a non-empty retrieve reply, preserving entry order.
pub fn encode_entries_response(movie_ids: &[u64]) -> Vec<u8> {
    let reply = EntriesReply {
        watch: movie_ids.to_vec(),
    };
    serde_json::to_vec(&reply).expect("entries reply serializes")
}

/// Parse a retrieve reply datagram into its tagged form.
///
/// Three payload shapes are recognized:
/// - `{"WATCH": [ints...]}` — the user's entries, order preserved;
/// - `{"status": "EMPTY"}` — no entries;
/// - a bare JSON string starting with `User` — the legacy service
///   signalled "no entries" with a prose reply such as
///   `"User 42 does not have a list"`. Accepted only as an interop shim
///   for that wire format.
///
/// Anything else is a [`WatchlistError::MalformedResponse`]; no partial
/// content is ever returned.
pub fn decode_response(payload: &[u8]) -> Result<RetrieveResponse, WatchlistError> {
    if let Ok(reply) = serde_json::from_slice::<EntriesReply>(payload) {
        return Ok(RetrieveResponse::Entries(reply.watch));
    }
    if let Ok(reply) = serde_json::from_slice::<StatusReply>(payload) {
        if reply.status == STATUS_EMPTY {
            return Ok(RetrieveResponse::Empty);
        }
        return Err(WatchlistError::MalformedResponse(format!(
            "unexpected status {:?} in retrieve reply",
            reply.status
        )));
    }
    // Legacy empty signalling: the original service replied with a JSON
    // string of prose beginning with "User".
    if let Ok(text) = serde_json::from_slice::<String>(payload) {
        if text.starts_with("User") {
            return Ok(RetrieveResponse::Empty);
        }
    }
    Err(WatchlistError::MalformedResponse(format!(
        "{} byte payload matched no known response shape",
        payload.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_request_round_trips() {
        let wire = encode_store_request(42, 7);
        match decode_request(&wire).unwrap() {
            Request::Store(req) => {
                assert_eq!(req.user_id, 42);
                assert_eq!(req.list, "WATCH");
                assert_eq!(req.movie_id, 7);
            }
            other => panic!("expected store request, got {:?}", other),
        }
    }

    #[test]
    fn store_request_uses_wire_field_names() {
        let wire = encode_store_request(42, 7);
        let value: serde_json::Value = serde_json::from_slice(&wire).unwrap();
        assert_eq!(value["user_ID"], 42);
        assert_eq!(value["LIST"], "WATCH");
        assert_eq!(value["movie_ID"], 7);
    }

    #[test]
    fn retrieve_request_round_trips() {
        let wire = encode_retrieve_request(42);
        match decode_request(&wire).unwrap() {
            Request::Retrieve(req) => assert_eq!(req.user_id, 42),
            other => panic!("expected retrieve request, got {:?}", other),
        }
        let value: serde_json::Value = serde_json::from_slice(&wire).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
    }

    #[test]
    fn empty_tag_decodes_to_empty() {
        let reply = encode_empty_response();
        assert_eq!(decode_response(&reply).unwrap(), RetrieveResponse::Empty);
    }

    #[test]
    fn legacy_prose_reply_decodes_to_empty() {
        let reply = serde_json::to_vec("User 42 does not have a list").unwrap();
        assert_eq!(decode_response(&reply).unwrap(), RetrieveResponse::Empty);
    }

    #[test]
    fn entries_preserve_order_and_duplicates() {
        let reply = br#"{"WATCH": [10, 20, 30, 20]}"#;
        assert_eq!(
            decode_response(reply).unwrap(),
            RetrieveResponse::Entries(vec![10, 20, 30, 20])
        );
    }

    #[test]
    fn entries_round_trip_through_encoder() {
        let reply = encode_entries_response(&[10, 20, 30]);
        assert_eq!(
            decode_response(&reply).unwrap(),
            RetrieveResponse::Entries(vec![10, 20, 30])
        );
    }

    #[test]
    fn junk_payload_is_malformed() {
        let err = decode_response(b"not json at all").unwrap_err();
        assert!(matches!(err, WatchlistError::MalformedResponse(_)));
    }

    #[test]
    fn unexpected_status_is_malformed() {
        let err = decode_response(br#"{"status": "OK"}"#).unwrap_err();
        assert!(matches!(err, WatchlistError::MalformedResponse(_)));
    }

    #[test]
    fn non_integer_entries_are_malformed() {
        let err = decode_response(br#"{"WATCH": ["ten"]}"#).unwrap_err();
        assert!(matches!(err, WatchlistError::MalformedResponse(_)));
    }

    #[test]
    fn junk_request_is_rejected() {
        assert!(decode_request(b"{]").is_err());
        assert!(decode_request(br#"{"movie_ID": 7}"#).is_err());
    }
}
