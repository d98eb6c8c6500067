//! Counter value <-> short code transform over the Flickr base58 alphabet.
//!
//! The alphabet is `123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ`:
//! digits first, then lowercase, then uppercase, without `0`, `O`, `I` and `l`.
//! A counter value is written as a base58 number, most significant symbol
//! first, so `0` becomes `"1"` and `1000` becomes `"if"`.

use crate::error::CodecError;
use bs58::Alphabet;

/// The alphabet used for every generated short code.
pub const ALPHABET: &Alphabet = Alphabet::FLICKR;

/// Stride reserved for spreading counter values before encoding.
///
/// Declared as part of the storage format but not applied: keys are always
/// the encoding of the raw counter value.
pub const RESERVED_STRIDE: u64 = 3364;

/// Encodes a counter value as a base58 string.
///
/// Total over `u64`; the output is at most 11 symbols long.
pub fn encode(id: u64) -> String {
    let bytes = id.to_be_bytes();
    // Leading zero bytes would each become a leading `1`, so only the
    // significant bytes are handed to the encoder.
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    bs58::encode(&bytes[first..])
        .with_alphabet(ALPHABET)
        .into_string()
}

/// Decodes a short code produced by [`encode`] back into its counter value.
pub fn decode(code: &str) -> Result<u64, CodecError> {
    if code.is_empty() {
        return Err(CodecError::Empty);
    }

    // `1` is the zero digit; only the code for zero itself may start with it.
    if code.len() > 1 && code.starts_with('1') {
        return Err(CodecError::NonCanonical(code.to_string()));
    }

    let bytes = bs58::decode(code)
        .with_alphabet(ALPHABET)
        .into_vec()
        .map_err(|e| match e {
            bs58::decode::Error::InvalidCharacter { character, index } => {
                CodecError::InvalidSymbol {
                    symbol: character,
                    index,
                }
            }
            bs58::decode::Error::NonAsciiCharacter { index } => CodecError::InvalidSymbol {
                symbol: code[index..].chars().next().unwrap_or('\u{FFFD}'),
                index,
            },
            other => CodecError::NonCanonical(other.to_string()),
        })?;

    if bytes.len() > std::mem::size_of::<u64>() {
        return Err(CodecError::Overflow(code.to_string()));
    }

    Ok(bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}
