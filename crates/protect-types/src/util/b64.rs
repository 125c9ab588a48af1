//! Base64 helpers.
//!
//! All base64 on the Protect wire uses the standard alphabet with padding.
//! These helpers exist so call sites do not each pick an engine.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;

/// Decodes a standard-alphabet base64 string to raw bytes.
///
/// # Errors
///
/// Returns an error if the input is not valid base64.
pub fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, base64::DecodeError> {
    b64.decode(input.as_ref())
}

/// Encodes raw bytes as a standard-alphabet base64 string.
pub fn encode<T: AsRef<[u8]>>(input: T) -> String {
    b64.encode(input.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        assert_eq!(encode(b"container"), "Y29udGFpbmVy");
        assert_eq!(decode("Y29udGFpbmVy").expect("valid base64"), b"container");
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(decode("not base64 !!").is_err());
    }
}
