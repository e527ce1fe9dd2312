use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::KEY_LEN;

/// Interpret raw key-file bytes as key material.
///
/// Surrounding ASCII whitespace is ignored, then three encodings are
/// tried in order: base64, hex, and the raw bytes themselves. The first
/// interpretation yielding exactly 32 bytes wins, so an operator can
/// drop in whichever form their tooling emits.
pub(crate) fn decode_key_material(raw: &[u8]) -> Option<[u8; KEY_LEN]> {
    let trimmed = trim_ascii_whitespace(raw);
    if let Ok(text) = std::str::from_utf8(trimmed) {
        if let Some(key) = BASE64.decode(text).ok().and_then(to_key) {
            return Some(key);
        }
        if let Some(key) = hex::decode(text).ok().and_then(to_key) {
            return Some(key);
        }
    }
    <[u8; KEY_LEN]>::try_from(trimmed).ok()
}

fn to_key(bytes: Vec<u8>) -> Option<[u8; KEY_LEN]> {
    <[u8; KEY_LEN]>::try_from(bytes.as_slice()).ok()
}

fn trim_ascii_whitespace(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !last.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [0x42; KEY_LEN];

    #[test]
    fn decodes_base64_key() {
        let encoded = BASE64.encode(KEY);
        assert_eq!(decode_key_material(encoded.as_bytes()), Some(KEY));
    }

    #[test]
    fn decodes_hex_key() {
        let encoded = hex::encode(KEY);
        assert_eq!(decode_key_material(encoded.as_bytes()), Some(KEY));
        let upper = encoded.to_uppercase();
        assert_eq!(decode_key_material(upper.as_bytes()), Some(KEY));
    }

    #[test]
    fn accepts_raw_32_bytes() {
        assert_eq!(decode_key_material(&KEY), Some(KEY));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let encoded = format!("  {}\r\n", BASE64.encode(KEY));
        assert_eq!(decode_key_material(encoded.as_bytes()), Some(KEY));
    }

    #[test]
    fn base64_wins_over_raw_interpretation() {
        // 44 base64 characters decode to 32 bytes; the raw bytes are 44
        // long and must not be taken literally.
        let encoded = BASE64.encode(KEY);
        assert_eq!(encoded.len(), 44);
        assert_eq!(decode_key_material(encoded.as_bytes()), Some(KEY));
    }

    #[test]
    fn hex_chars_that_parse_as_short_base64_fall_through_to_hex() {
        // 64 hex characters are also valid base64, but base64 yields 48
        // bytes and is rejected; the hex reading yields the key.
        let encoded = hex::encode(KEY);
        assert_eq!(encoded.len(), 64);
        assert!(BASE64.decode(&encoded).is_ok());
        assert_eq!(decode_key_material(encoded.as_bytes()), Some(KEY));
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert_eq!(decode_key_material(&[0x42; 31]), None);
        assert_eq!(decode_key_material(&[0x42; 33]), None);
        assert_eq!(decode_key_material(hex::encode([0x42; 31]).as_bytes()), None);
        assert_eq!(
            decode_key_material(BASE64.encode([0x42; 33]).as_bytes()),
            None
        );
        assert_eq!(decode_key_material(b""), None);
        assert_eq!(decode_key_material(b"   \n"), None);
    }

    #[test]
    fn non_utf8_garbage_of_wrong_length_is_rejected() {
        assert_eq!(decode_key_material(&[0xFF; 20]), None);
    }

    #[test]
    fn non_utf8_raw_key_is_accepted() {
        let key = [0xFF; KEY_LEN];
        assert_eq!(decode_key_material(&key), Some(key));
    }
}
