//! Human-readable 10 character base62 identifiers.
//!
//! An id reads `M A SS Y M D h m s`: machine symbol, app symbol, a two
//! symbol per-second sequence, then one symbol each for the year offset
//! from 2019, month, day, hour, minute and second.

pub mod error;
pub mod host;
mod readable;
mod readable_id;

pub use error::{Error, HostIdentityError};
pub use host::{FixedSymbol, HostIdentity, MacAddress, NetworkInterfaces, StaticAddresses};
pub use readable::{
    ReadableGenerator, ReadableSettings, DEFAULT_APP_SYMBOL, MAX_SEQUENCE, START_YEAR,
};
pub use readable_id::{ReadableId, ReadableParts, ID_LENGTH};
