//! Shared test doubles for the Filmorate social core.

mod clock;
mod repository;

pub use clock::{FixedClock, SteppingClock, fixed_time};
pub use repository::{FailingFeedRepository, RecordingFeedRepository};
