use jiff::{SignedDuration, Timestamp};
use modular_bitfield::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

pub const SEQUENCE_BITS: u32 = 10;
pub const MACHINE_BITS: u32 = 2;
pub const DATACENTER_BITS: u32 = 3;
pub const TIMESTAMP_BITS: u32 = 41;

pub const MAX_SEQUENCE: u16 = (1 << SEQUENCE_BITS) - 1;
pub const MAX_MACHINE_ID: u8 = (1 << MACHINE_BITS) - 1;
pub const MAX_DATACENTER_ID: u8 = (1 << DATACENTER_BITS) - 1;
pub const MAX_TIMESTAMP: u64 = (1 << TIMESTAMP_BITS) - 1;

const USED_BITS: u32 = TIMESTAMP_BITS + DATACENTER_BITS + MACHINE_BITS + SEQUENCE_BITS;

/// A 64-bit Snowflake identifier.
///
/// Fields are declared least significant first, so the packed little-endian
/// value reads `timestamp | datacenter_id | machine_id | sequence` from the
/// top down.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnowflakeId {
    /// 10 bits for the per-millisecond sequence.
    pub sequence: B10,
    /// 2 bits for the machine id (up to 4 machines per datacenter).
    pub machine_id: B2,
    /// 3 bits for the datacenter id (up to 8 datacenters).
    pub datacenter_id: B3,
    /// 41 bits for milliseconds since the generator's epoch.
    pub timestamp: B41,
    #[skip]
    __: B8,
}

impl SnowflakeId {
    /// Returns the packed value.
    pub fn as_u64(self) -> u64 {
        u64::from_le_bytes(self.into_bytes())
    }

    /// Returns the packed value as a signed integer; it is never negative.
    pub fn as_i64(self) -> i64 {
        self.as_u64() as i64
    }

    /// Unpacks a raw value, rejecting anything with bits above the layout.
    pub fn from_u64(value: u64) -> Option<Self> {
        if value >> USED_BITS != 0 {
            return None;
        }
        Some(Self::from_bytes(value.to_le_bytes()))
    }

    /// The instant this id was issued at, given the epoch it was generated
    /// against. `None` if that lies outside the supported time range.
    pub fn instant(self, epoch: Timestamp) -> Option<Timestamp> {
        epoch
            .checked_add(SignedDuration::from_millis(self.timestamp() as i64))
            .ok()
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.as_u64()
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.as_i64()
    }
}

impl Ord for SnowflakeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_u64().cmp(&other.as_u64())
    }
}

impl PartialOrd for SnowflakeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("timestamp", &self.timestamp())
            .field("datacenter_id", &self.datacenter_id())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

impl Serialize for SnowflakeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.as_u64())
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(deserializer)?;
        Self::from_u64(raw).ok_or_else(|| {
            serde::de::Error::custom(format!("{raw} uses bits outside the snowflake layout"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_fields_in_layout_order() {
        let id = SnowflakeId::new()
            .with_timestamp(1)
            .with_datacenter_id(1)
            .with_machine_id(1)
            .with_sequence(1);
        let expected = (1u64 << 15) | (1 << 12) | (1 << 10) | 1;
        assert_eq!(id.as_u64(), expected);
    }

    #[test]
    fn unpacking_recovers_every_field() {
        let id = SnowflakeId::new()
            .with_timestamp(MAX_TIMESTAMP)
            .with_datacenter_id(5)
            .with_machine_id(2)
            .with_sequence(777);
        let raw = id.as_u64();

        assert_eq!(raw >> 15, MAX_TIMESTAMP);
        assert_eq!((raw >> 12) & 0b111, 5);
        assert_eq!((raw >> 10) & 0b11, 2);
        assert_eq!(raw & 0x3FF, 777);

        let back = SnowflakeId::from_u64(raw).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.timestamp(), MAX_TIMESTAMP);
        assert_eq!(back.datacenter_id(), 5);
        assert_eq!(back.machine_id(), 2);
        assert_eq!(back.sequence(), 777);
    }

    #[test]
    fn largest_id_is_non_negative() {
        let id = SnowflakeId::new()
            .with_timestamp(MAX_TIMESTAMP)
            .with_datacenter_id(MAX_DATACENTER_ID)
            .with_machine_id(MAX_MACHINE_ID)
            .with_sequence(MAX_SEQUENCE);
        assert_eq!(id.as_u64(), (1u64 << 56) - 1);
        assert!(id.as_i64() > 0);
    }

    #[test]
    fn rejects_values_above_56_bits() {
        assert!(SnowflakeId::from_u64(1 << 56).is_none());
        assert!(SnowflakeId::from_u64((1 << 56) - 1).is_some());
    }

    #[test]
    fn orders_by_packed_value() {
        let earlier = SnowflakeId::new().with_timestamp(10).with_sequence(1023);
        let later = SnowflakeId::new().with_timestamp(11);
        assert!(earlier < later);
    }

    #[test]
    fn instant_is_relative_to_epoch() {
        let epoch = Timestamp::from_second(1_000).unwrap();
        let id = SnowflakeId::new().with_timestamp(1_500);
        assert_eq!(id.instant(epoch).unwrap().as_millisecond(), 1_001_500);
    }

    #[test]
    fn serializes_as_integer() {
        let id = SnowflakeId::new().with_timestamp(2).with_sequence(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.as_u64().to_string());
        let back: SnowflakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let too_wide = (1u64 << 60).to_string();
        assert!(serde_json::from_str::<SnowflakeId>(&too_wide).is_err());
    }
}
