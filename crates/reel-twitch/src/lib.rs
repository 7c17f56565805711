//! Twitch Helix clip discovery.
//!
//! This crate provides:
//! - OAuth2 client-credentials token exchange with a lazy session cache
//! - Game name to game ID lookup
//! - Time-windowed clip listing ordered by recency
//! - The `ClipSource` seam the orchestrator depends on

pub mod client;
pub mod error;
pub mod source;
pub mod token_cache;
pub mod types;

pub use client::{HelixClient, TwitchConfig};
pub use error::{DiscoveryError, DiscoveryResult};
pub use source::ClipSource;
