//! Minimal ABI codec for string-typed methods
//!
//! The collection contract's constructor and configuration methods only take
//! and return strings, which is all this module supports.

use sha3::{Digest, Keccak256};

use crate::EndpointError;

const WORD: usize = 32;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Canonical signature of a method taking `arg_count` strings
pub fn string_signature(method: &str, arg_count: usize) -> String {
    format!("{method}({})", vec!["string"; arg_count].join(","))
}

/// First four bytes of the Keccak-256 hash of a method signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

fn word(value: usize) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    out[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    out
}

/// Encode a tuple of strings (head offsets followed by length-prefixed tails)
pub fn encode_strings(args: &[String]) -> Vec<u8> {
    let mut head = Vec::with_capacity(args.len() * WORD);
    let mut tail = Vec::new();
    let mut offset = args.len() * WORD;

    for arg in args {
        head.extend_from_slice(&word(offset));

        let bytes = arg.as_bytes();
        let padded = padded_len(bytes.len());
        tail.extend_from_slice(&word(bytes.len()));
        tail.extend_from_slice(bytes);
        tail.resize(tail.len() + padded - bytes.len(), 0);

        offset += WORD + padded;
    }

    head.extend_from_slice(&tail);
    head
}

/// Calldata for `method(string,...)`
pub fn encode_call(method: &str, args: &[String]) -> Vec<u8> {
    let signature = string_signature(method, args.len());
    let mut data = selector(&signature).to_vec();
    data.extend_from_slice(&encode_strings(args));
    data
}

fn read_word(data: &[u8], at: usize) -> Result<usize, EndpointError> {
    let end = at
        .checked_add(WORD)
        .ok_or_else(|| EndpointError::Abi(format!("offset {at} out of range")))?;
    let slice = data
        .get(at..end)
        .ok_or_else(|| EndpointError::Abi(format!("return data too short at offset {at}")))?;

    if slice[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(EndpointError::Abi(format!("word at offset {at} out of range")));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&slice[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(buf))
        .map_err(|_| EndpointError::Abi(format!("word at offset {at} out of range")))
}

/// Decode a single `string` return value
pub fn decode_string(data: &[u8]) -> Result<String, EndpointError> {
    let offset = read_word(data, 0)?;
    let len = read_word(data, offset)?;
    let start = offset
        .checked_add(WORD)
        .ok_or_else(|| EndpointError::Abi(format!("offset {offset} out of range")))?;
    let end = start
        .checked_add(len)
        .ok_or_else(|| EndpointError::Abi(format!("string length {len} out of range")))?;
    let bytes = data
        .get(start..end)
        .ok_or_else(|| EndpointError::Abi("string extends past return data".to_string()))?;

    String::from_utf8(bytes.to_vec()).map_err(|e| EndpointError::Abi(e.to_string()))
}

/// Parse `0x`-prefixed hex into bytes
pub fn decode_hex(value: &str) -> Result<Vec<u8>, EndpointError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).map_err(|e| EndpointError::InvalidResponse(format!("bad hex '{value}': {e}")))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a `0x`-prefixed hex quantity
pub fn parse_quantity(value: &str) -> Result<u128, EndpointError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| EndpointError::InvalidResponse(format!("bad quantity '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_selectors() {
        assert_eq!(hex::encode(selector("baseURI()")), "6c0360eb");
        assert_eq!(hex::encode(selector("setBaseURI(string)")), "55f804b3");
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn test_string_signature() {
        assert_eq!(string_signature("baseURI", 0), "baseURI()");
        assert_eq!(string_signature("setBaseURI", 1), "setBaseURI(string)");
        assert_eq!(string_signature("init", 2), "init(string,string)");
    }

    #[test]
    fn test_encode_single_string() {
        let encoded = encode_strings(&["abc".to_string()]);
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 0x20);
        assert_eq!(encoded[63], 3);
        assert_eq!(&encoded[64..67], b"abc");
        assert!(encoded[67..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_two_strings_offsets() {
        let encoded = encode_strings(&["NFT Collection TomAndJerry".to_string(), "COL-TNJ".to_string()]);
        // head: two offsets; tails: (len + 32 bytes) each
        assert_eq!(read_word(&encoded, 0).unwrap(), 64);
        assert_eq!(read_word(&encoded, 32).unwrap(), 128);
        assert_eq!(read_word(&encoded, 64).unwrap(), 26);
        assert_eq!(read_word(&encoded, 128).unwrap(), 7);
        assert_eq!(encoded.len(), 192);
    }

    #[test]
    fn test_decode_string_from_encoded() {
        let uri = "ipfs://QmdVwL4gL9HsKu6gm481VUyHg1rmtzTBTyuKLhJJcuWCe7/";
        let encoded = encode_strings(&[uri.to_string()]);
        assert_eq!(decode_string(&encoded).unwrap(), uri);

        let empty = encode_strings(&[String::new()]);
        assert_eq!(decode_string(&empty).unwrap(), "");
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        let encoded = encode_strings(&["abcdef".to_string()]);
        assert!(decode_string(&encoded[..68]).is_err());
        assert!(decode_string(&[]).is_err());
    }

    #[test]
    fn test_decode_rejects_oversized_words() {
        let mut huge_len = vec![0u8; 64];
        huge_len[31] = 0x20;
        huge_len[56..64].copy_from_slice(&u64::MAX.to_be_bytes());
        assert!(matches!(decode_string(&huge_len), Err(EndpointError::Abi(_))));

        let mut huge_offset = vec![0u8; 32];
        huge_offset[24..32].copy_from_slice(&u64::MAX.to_be_bytes());
        assert!(matches!(decode_string(&huge_offset), Err(EndpointError::Abi(_))));
    }

    #[test]
    fn test_encode_call_prefixes_selector() {
        let data = encode_call("setBaseURI", &["cid".to_string()]);
        assert_eq!(&data[..4], &[0x55, 0xf8, 0x04, 0xb3]);
        assert_eq!(data.len(), 4 + 96);
    }

    #[test]
    fn test_quantities() {
        assert_eq!(parse_quantity("0x7a69").unwrap(), 31337);
        assert_eq!(parse_quantity("0x").unwrap(), 0);
        assert!(parse_quantity("0xzz").is_err());
        assert_eq!(encode_hex(&[0xde, 0xad]), "0xdead");
        assert_eq!(decode_hex("0xdead").unwrap(), vec![0xde, 0xad]);
    }
}
