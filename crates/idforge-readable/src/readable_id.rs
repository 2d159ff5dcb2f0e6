use crate::error::Error;
use idforge_core::base62;
use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Length of every readable id.
pub const ID_LENGTH: usize = 10;

const SEQUENCE: std::ops::Range<usize> = 2..4;
const TIMESTAMP: std::ops::Range<usize> = 4..10;

/// A validated 10 character readable identifier.
///
/// Ordering is chronological: timestamp symbols first, then the sequence,
/// then machine and app symbols. Because the sequence sits before the
/// timestamp in the string, this differs from plain string ordering once ids
/// span more than one second.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ReadableId(SmolStr);

/// The decoded fields of a [`ReadableId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadableParts {
    pub machine: char,
    pub app: char,
    pub sequence: u16,
    pub year: i16,
    pub month: i8,
    pub day: i8,
    pub hour: i8,
    pub minute: i8,
    pub second: i8,
}

impl ReadableParts {
    /// The civil date-time encoded in the id, in the generator's time zone.
    pub fn date_time(&self) -> Result<DateTime, Error> {
        DateTime::new(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            0,
        )
        .map_err(|e| Error::InvalidId(format!("invalid timestamp fields: {e}")))
    }
}

impl ReadableId {
    /// Builds an id from its fields. Fails if the year has no single symbol.
    pub(crate) fn assemble(
        machine: char,
        app: char,
        sequence: u16,
        at: DateTime,
    ) -> Result<Self, Error> {
        let year = at.year();
        let year_offset = year - crate::START_YEAR;
        let year_symbol = component(year_offset).ok_or(Error::YearOutOfRange { year })?;

        let mut id = String::with_capacity(ID_LENGTH);
        id.push(machine);
        id.push(app);
        id.push_str(&base62::encode_padded(u64::from(sequence), SEQUENCE.len()));
        id.push(year_symbol);
        for value in [at.month(), at.day(), at.hour(), at.minute(), at.second()] {
            // Calendar fields are all below 62.
            let symbol = component(i16::from(value))
                .ok_or_else(|| Error::InvalidId(format!("time component {value} out of range")))?;
            id.push(symbol);
        }

        Self::parse(&id)
    }

    /// Parses and validates a readable id.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let id = Self(SmolStr::new(input));
        id.validate()?;
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes every field.
    pub fn parts(&self) -> ReadableParts {
        let digits: Vec<u8> = self
            .0
            .chars()
            .map(|c| base62::index_of(c).unwrap_or(0))
            .collect();
        ReadableParts {
            machine: self.char_at(0),
            app: self.char_at(1),
            sequence: u16::from(digits[2]) * 62 + u16::from(digits[3]),
            year: crate::START_YEAR + i16::from(digits[4]),
            month: digits[5] as i8,
            day: digits[6] as i8,
            hour: digits[7] as i8,
            minute: digits[8] as i8,
            second: digits[9] as i8,
        }
    }

    fn char_at(&self, index: usize) -> char {
        self.0.as_bytes()[index] as char
    }

    fn validate(&self) -> Result<(), Error> {
        let raw = self.as_str();
        if raw.len() != ID_LENGTH {
            return Err(Error::InvalidId(format!(
                "expected {ID_LENGTH} symbols, got {:?}",
                raw
            )));
        }
        if let Some(bad) = raw.chars().find(|&c| base62::index_of(c).is_none()) {
            return Err(Error::InvalidId(format!(
                "{bad:?} is not a base62 symbol in {raw:?}"
            )));
        }

        self.parts().date_time()?;
        Ok(())
    }

    fn chronological_key(&self) -> (&[u8], &[u8], &[u8]) {
        let bytes = self.0.as_bytes();
        (&bytes[TIMESTAMP], &bytes[SEQUENCE], &bytes[..SEQUENCE.start])
    }
}

fn component(value: i16) -> Option<char> {
    u8::try_from(value).ok().and_then(base62::symbol)
}

impl Ord for ReadableId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chronological_key().cmp(&other.chronological_key())
    }
}

impl PartialOrd for ReadableId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for ReadableId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ReadableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadableId").field(&self.0).finish()
    }
}

impl fmt::Display for ReadableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ReadableId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ReadableId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn assembles_fields_in_order() {
        let at = date(2024, 3, 15).at(10, 20, 30, 0);
        let id = ReadableId::assemble('A', '0', 0, at).unwrap();
        assert_eq!(id.as_str(), "A00053FAKU");
    }

    #[test]
    fn pads_and_encodes_sequence() {
        let at = date(2024, 3, 15).at(10, 20, 30, 0);
        assert_eq!(&ReadableId::assemble('A', '0', 61, at).unwrap().as_str()[2..4], "0z");
        assert_eq!(&ReadableId::assemble('A', '0', 62, at).unwrap().as_str()[2..4], "10");
        assert_eq!(&ReadableId::assemble('A', '0', 3843, at).unwrap().as_str()[2..4], "zz");
    }

    #[test]
    fn year_boundaries() {
        let first = ReadableId::assemble('1', '0', 0, date(2019, 1, 1).at(0, 0, 0, 0)).unwrap();
        assert_eq!(first.as_str(), "1000011000");

        let last = ReadableId::assemble('1', '0', 0, date(2080, 12, 31).at(23, 59, 59, 0)).unwrap();
        assert_eq!(&last.as_str()[4..], "zCVNxx");

        assert_eq!(
            ReadableId::assemble('1', '0', 0, date(2018, 12, 31).at(23, 59, 59, 0)),
            Err(Error::YearOutOfRange { year: 2018 })
        );
        assert_eq!(
            ReadableId::assemble('1', '0', 0, date(2081, 1, 1).at(0, 0, 0, 0)),
            Err(Error::YearOutOfRange { year: 2081 })
        );
    }

    #[test]
    fn parts_round_trip() {
        let at = date(2031, 11, 30).at(23, 5, 0, 0);
        let id = ReadableId::assemble('q', 'B', 1234, at).unwrap();
        let parts = id.parts();
        assert_eq!(parts.machine, 'q');
        assert_eq!(parts.app, 'B');
        assert_eq!(parts.sequence, 1234);
        assert_eq!(parts.date_time(), Ok(at));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(ReadableId::parse("").is_err());
        assert!(ReadableId::parse("A00053FAK").is_err());
        assert!(ReadableId::parse("A00053FAKU1").is_err());
        assert!(ReadableId::parse("A0005-FAKU").is_err());
        // month 13
        assert!(ReadableId::parse("A0005DFAKU").is_err());
        // February 30th
        assert!(ReadableId::parse("A00052UAKU").is_err());
        assert!(ReadableId::parse("A00053FAKU").is_ok());
    }

    #[test]
    fn orders_chronologically_across_seconds() {
        let earlier = ReadableId::parse("A0zz53FAKU").unwrap();
        let later = ReadableId::parse("A00053FAKV").unwrap();
        assert!(earlier.as_str() > later.as_str());
        assert!(earlier < later);

        let first = ReadableId::parse("A00053FAKU").unwrap();
        let second = ReadableId::parse("A00153FAKU").unwrap();
        assert!(first < second);
    }

    #[test]
    fn serializes_as_string() {
        let id = ReadableId::parse("A00053FAKU").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"A00053FAKU\"");
        let back: ReadableId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ReadableId>("\"nope\"").is_err());
    }
}
