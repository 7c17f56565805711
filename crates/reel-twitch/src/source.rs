//! Clip source seam.

use async_trait::async_trait;
use reel_models::{Clip, DiscoveryWindow};

use crate::error::DiscoveryResult;

/// Anything that can list recent clips for a game.
#[async_trait]
pub trait ClipSource: Send + Sync {
    /// Clips for `game_name` created inside `window`, newest first,
    /// at most `max_count` of them.
    async fn discover(
        &self,
        game_name: &str,
        window: DiscoveryWindow,
        max_count: u32,
    ) -> DiscoveryResult<Vec<Clip>>;
}
