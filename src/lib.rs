//! Music Curator - catalog maintenance for a local music library.
//!
//! Keeps a catalog of tracks in step with a music folder, discovers missing
//! tracks from artist discographies, acquires them with external tools and
//! fills in genres from folksonomy tags.

pub mod acquisition;
pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod discography;
pub mod error;
pub mod genre;
pub mod library;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod organizer;
pub mod pacing;
pub mod providers;
pub mod scanner;
pub mod similarity;
#[cfg(test)]
pub mod test_utils;
