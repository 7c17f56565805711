//! Per-target publish state machine.

use serde::{Deserialize, Serialize};

/// Publish progress of one job against one target.
///
/// ```text
/// Created ──> ContainerCreated ──> AwaitingReady ─┐
///    │               │    │            │   ^      │
///    │               │    │            │   └──────┘
///    │               │    └──> Confirmed <────────┤
///    └──> Failed <───┴──────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    /// No remote container exists yet
    #[default]
    Created,
    /// Remote container obtained, not yet guaranteed playable
    ContainerCreated,
    /// Target reported the media is still being processed
    AwaitingReady,
    /// Target acknowledged publication
    Confirmed,
    /// Budget exhausted or non-retryable error
    Failed,
}

impl PublishState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishState::Created => "created",
            PublishState::ContainerCreated => "container_created",
            PublishState::AwaitingReady => "awaiting_ready",
            PublishState::Confirmed => "confirmed",
            PublishState::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PublishState::Confirmed | PublishState::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: PublishState) -> bool {
        use PublishState::*;

        match (self, next) {
            (Created, ContainerCreated) | (Created, Failed) => true,
            (ContainerCreated, AwaitingReady | Confirmed | Failed) => true,
            (AwaitingReady, AwaitingReady | Confirmed | Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PublishState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
