//! Penguins game client.
//!
//! `games::penguins` holds the board model and move generation,
//! `client` drives a session against a game server.

pub mod client;
pub mod games;
