//! Shared building blocks for the idforge generators.
//!
//! This crate provides the base62 codec, the clock abstraction that both
//! generators read time through, and the [`IdGenerator`] trait.

pub mod base62;
pub mod clock;
pub mod error;
pub mod generator;

pub use clock::{Clock, SystemClock};
pub use error::Base62Error;
pub use generator::IdGenerator;

#[cfg(any(test, feature = "test-util"))]
pub use clock::test_clock::ManualClock;
