//! Reel publishing.
//!
//! Both targets follow the same two-phase shape: create a container that
//! references the staged media URL, then publish it once the platform has
//! finished ingesting. The [`PublishCoordinator`] drives that protocol with
//! a fixed-interval readiness poll, parameterized by a [`PublishTarget`].

pub mod coordinator;
pub mod error;
pub mod facebook;
pub mod graph;
pub mod instagram;
pub mod metrics;
pub mod policy;
pub mod sleeper;
pub mod target;

pub use coordinator::PublishCoordinator;
pub use error::{PublishError, PublishPhase, PublishResult, TargetError, TargetResult};
pub use facebook::{FacebookConfig, FacebookReels};
pub use graph::{GraphClient, NotReadyRule};
pub use instagram::{InstagramConfig, InstagramReels};
pub use policy::PublishPolicy;
pub use sleeper::{Sleeper, TokioSleeper};
pub use target::PublishTarget;
