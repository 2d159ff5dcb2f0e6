//! Base62 codec over the ASCII-ordered alphabet `0-9A-Za-z`.
//!
//! Because the alphabet is in ASCII order, fixed-width encodings compare
//! lexicographically in the same order as the numbers they encode.

use crate::error::Base62Error;

/// Number of symbols in the alphabet.
pub const BASE: u64 = 62;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

// u64::MAX needs 11 base62 digits.
const MAX_DIGITS: usize = 11;

/// Encodes `value` most-significant symbol first. `encode(0)` is `"0"`.
pub fn encode(value: u64) -> String {
    let mut buf = [0u8; MAX_DIGITS];
    let mut pos = MAX_DIGITS;
    let mut rest = value;
    loop {
        pos -= 1;
        buf[pos] = ALPHABET[(rest % BASE) as usize];
        rest /= BASE;
        if rest == 0 {
            break;
        }
    }
    buf[pos..].iter().map(|&b| b as char).collect()
}

/// Encodes a signed value, rejecting negatives.
pub fn encode_signed(value: i64) -> Result<String, Base62Error> {
    u64::try_from(value)
        .map(encode)
        .map_err(|_| Base62Error::Negative(value))
}

/// Encodes `value` and left-pads it with `'0'` up to `width` symbols.
///
/// Values that need more than `width` symbols are returned unpadded.
pub fn encode_padded(value: u64, width: usize) -> String {
    format!("{:0>width$}", encode(value), width = width)
}

/// Decodes a base62 string into an integer.
///
/// Blank input is an error rather than zero: callers must treat it as "no
/// value".
pub fn decode(input: &str) -> Result<u64, Base62Error> {
    if input.trim().is_empty() {
        return Err(Base62Error::Blank);
    }

    input
        .chars()
        .enumerate()
        .try_fold(0u64, |acc, (position, symbol)| {
            let digit = index_of(symbol).ok_or(Base62Error::InvalidSymbol { symbol, position })?;
            acc.checked_mul(BASE)
                .and_then(|acc| acc.checked_add(u64::from(digit)))
                .ok_or(Base62Error::Overflow)
        })
}

/// Returns the symbol for a digit in `0..62`.
pub fn symbol(index: u8) -> Option<char> {
    ALPHABET.get(usize::from(index)).map(|&b| b as char)
}

/// Returns the digit value of a symbol.
pub fn index_of(symbol: char) -> Option<u8> {
    match symbol {
        '0'..='9' => Some(symbol as u8 - b'0'),
        'A'..='Z' => Some(symbol as u8 - b'A' + 10),
        'a'..='z' => Some(symbol as u8 - b'a' + 36),
        _ => None,
    }
}

/// Reduces `value` into `1..=61` and returns its symbol.
///
/// The result is never `'0'`, which stays free as a "none" marker.
pub fn nonzero_symbol(value: u64) -> char {
    let index = (value % (BASE - 1)) as usize + 1;
    ALPHABET[index] as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_values() {
        assert_eq!(encode(0), "0");
        assert_eq!(encode(9), "9");
        assert_eq!(encode(10), "A");
        assert_eq!(encode(36), "a");
        assert_eq!(encode(61), "z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(62 * 62 - 1), "zz");
        assert_eq!(encode(62 * 62), "100");
    }

    #[test]
    fn encodes_u64_max_and_back() {
        let encoded = encode(u64::MAX);
        assert_eq!(encoded.len(), MAX_DIGITS);
        assert_eq!(decode(&encoded), Ok(u64::MAX));
    }

    #[test]
    fn round_trips_six_digit_range() {
        // Sample [0, 62^6) with a prime stride.
        let upper = BASE.pow(6);
        let mut n = 0;
        while n < upper {
            assert_eq!(decode(&encode(n)), Ok(n), "value {n}");
            n += 7_919;
        }
        assert_eq!(decode(&encode(upper - 1)), Ok(upper - 1));
    }

    #[test]
    fn blank_input_is_not_zero() {
        assert_eq!(decode(""), Err(Base62Error::Blank));
        assert_eq!(decode("   "), Err(Base62Error::Blank));
    }

    #[test]
    fn rejects_symbols_outside_alphabet() {
        assert_eq!(
            decode("ab-c"),
            Err(Base62Error::InvalidSymbol {
                symbol: '-',
                position: 2
            })
        );
    }

    #[test]
    fn rejects_overflow() {
        assert_eq!(decode("zzzzzzzzzzzz"), Err(Base62Error::Overflow));
    }

    #[test]
    fn negative_input_is_rejected() {
        assert_eq!(encode_signed(-1), Err(Base62Error::Negative(-1)));
        assert_eq!(encode_signed(62), Ok("10".to_string()));
    }

    #[test]
    fn pads_to_width() {
        assert_eq!(encode_padded(0, 2), "00");
        assert_eq!(encode_padded(61, 2), "0z");
        assert_eq!(encode_padded(3843, 2), "zz");
        assert_eq!(encode_padded(3844, 2), "100");
    }

    #[test]
    fn symbol_lookups_are_inverse() {
        for i in 0..62u8 {
            let c = symbol(i).unwrap();
            assert_eq!(index_of(c), Some(i));
        }
        assert_eq!(symbol(62), None);
        assert_eq!(index_of('_'), None);
    }

    #[test]
    fn nonzero_symbol_never_zero() {
        assert_eq!(nonzero_symbol(0), '1');
        assert_eq!(nonzero_symbol(60), 'z');
        assert_eq!(nonzero_symbol(61), '1');
        for v in 0..500 {
            assert_ne!(nonzero_symbol(v), '0');
        }
    }
}
