use thiserror::Error;

/// Errors returned by the base62 codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Base62Error {
    /// Blank input carries no value; it is never read as zero.
    #[error("cannot decode a blank base62 string")]
    Blank,
    #[error("cannot encode negative value {0} as base62")]
    Negative(i64),
    #[error("invalid base62 symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
    #[error("base62 value does not fit in 64 bits")]
    Overflow,
}
