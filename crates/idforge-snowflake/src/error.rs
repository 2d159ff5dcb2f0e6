use jiff::Timestamp;
use thiserror::Error;

/// Errors returned by Snowflake initialization and ID generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid datacenter id {datacenter_id}; expected 0..={max}")]
    InvalidDatacenterId { datacenter_id: u8, max: u8 },
    #[error("invalid machine id {machine_id}; expected 0..={max}")]
    InvalidMachineId { machine_id: u8, max: u8 },
    #[error("epoch is ahead of current clock time: epoch={epoch}, now={now}")]
    EpochAhead { epoch: Timestamp, now: Timestamp },
    /// The clock reported a time before the last issued id. Never retried:
    /// the clock source has to be fixed.
    #[error("clock moved backwards, refusing to generate id: now={now}ms, last={last}ms")]
    ClockMovedBackwards { now: i64, last: i64 },
    #[error("overtime limit")]
    OverTimeLimit,
    #[error("generator state lock is poisoned")]
    StatePoisoned,
    #[error("default generator is already initialized")]
    AlreadyInitialized,
}
