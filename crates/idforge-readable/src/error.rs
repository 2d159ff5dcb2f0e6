use idforge_core::Base62Error;
use jiff::civil::DateTime;
use thiserror::Error;

/// Errors returned by readable ID generation and parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The rendered local time fell before the last issued id, either because
    /// the clock stepped back or the zone's offset did. Never retried.
    #[error("clock moved backwards, refusing to generate id: now={now}, last={last}")]
    ClockMovedBackwards { now: DateTime, last: DateTime },
    #[error("invalid app id: {0}")]
    InvalidAppId(#[source] Base62Error),
    #[error("host identity unavailable: {0}")]
    HostIdentity(#[from] HostIdentityError),
    /// Only years 2019..=2080 fit in a single base62 symbol.
    #[error("year {year} cannot be encoded; expected 2019..=2080")]
    YearOutOfRange { year: i16 },
    /// The clock is past the last representable instant.
    #[error("clock is beyond the supported time range")]
    OverTimeLimit,
    #[error("invalid readable id: {0}")]
    InvalidId(String),
    #[error("generator state lock is poisoned")]
    StatePoisoned,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostIdentityError {
    #[error("failed to enumerate network interfaces: {0}")]
    Enumerate(String),
    #[error("invalid hardware address {0:?}")]
    InvalidHardwareAddress(String),
    #[error("{0:?} is not a base62 symbol")]
    InvalidSymbol(char),
}
