//! MusicBrainz API integration
//!
//! No-credential fallback for discography, the tag source for genre
//! enrichment and the title lookup used when organizing untagged files.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use client::{MUSICBRAINZ_ID, MusicBrainzClient};
