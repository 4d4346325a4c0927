//! Spotify Web API integration
//!
//! Primary discography provider. Requires client-credentials; without them
//! the client reports itself unconfigured and is skipped.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;

pub use client::{SPOTIFY_ID, SpotifyClient};
