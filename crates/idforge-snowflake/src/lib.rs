//! 64-bit Snowflake identifiers.
//!
//! Layout, most significant first: 41 bits of milliseconds since a custom
//! epoch, 3 bits of datacenter id, 2 bits of machine id and a 10 bit
//! per-millisecond sequence. The top 8 bits are always zero.

pub mod error;
pub mod global;
mod snowflake;
mod snowflake_id;

pub use error::Error;
pub use idforge_core::{Clock, SystemClock};
pub use snowflake::{Snowflake, SnowflakeSettings, DEFAULT_EPOCH};
pub use snowflake_id::{
    SnowflakeId, DATACENTER_BITS, MACHINE_BITS, MAX_DATACENTER_ID, MAX_MACHINE_ID, MAX_SEQUENCE,
    MAX_TIMESTAMP, SEQUENCE_BITS, TIMESTAMP_BITS,
};
