// Library root
// -----------
// This crate exposes a small library surface shared by the two binaries:
// the interactive CLI (`main.rs`) and the watchlist daemon
// (`bin/watchlistd.rs`).
//
// Module responsibilities:
// - `api`: Blocking HTTP client for The Movie Database (discover search
//   and single-movie title lookup).
// - `protocol`: Wire codec for the watchlist datagram protocol, both
//   request and response sides.
// - `watchlist`: Client half of the protocol; one bounded
//   request/response exchange per call.
// - `service`: Service half of the protocol; per-user list store,
//   request dispatch, and the UDP serve loop.
// - `directory`: Username to user-id mapping with JSON persistence.
// - `ui`: Terminal flows that tie the above together for the CLI.
pub mod api;
pub mod directory;
pub mod protocol;
pub mod service;
pub mod ui;
pub mod watchlist;
