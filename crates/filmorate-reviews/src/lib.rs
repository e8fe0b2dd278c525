//! Reviews and usefulness votes bounded context.
//!
//! Owns film reviews and the vote ledger behind each review's `useful`
//! score. The score is a cached counter adjusted by the delta of every vote
//! change; a full recompute from vote rows is available to detect and
//! repair drift.

pub mod application;
pub mod domain;
