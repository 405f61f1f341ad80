use base64ct::{Base64, Encoding};

/// Standard (padded) base64 encode, matching the browser's `btoa`.
pub fn base64_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Standard (padded) base64 decode.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64::decode_vec(s)
}

/// True if `s` decodes and re-encodes to exactly itself.
pub fn is_canonical_base64(s: &str) -> bool {
    match base64_decode(s) {
        Ok(bytes) => base64_encode(&bytes) == s,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_output() {
        assert_eq!(base64_encode(b"ab"), "YWI=");
        assert_eq!(base64_decode("YWI=").unwrap(), b"ab");
    }

    #[test]
    fn standard_alphabet() {
        // Bytes that produce + and / in standard base64
        let encoded = base64_encode(&[0xfb, 0xff, 0xfe]);
        assert_eq!(encoded, "+//+");
    }

    #[test]
    fn rejects_garbage() {
        assert!(base64_decode("not-valid-base64!!").is_err());
        assert!(!is_canonical_base64("not-valid-base64!!"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(base64_encode(b""), "");
        assert!(is_canonical_base64(""));
    }
}
