//! # Base64url Encoding
//!
//! URL-safe base64 without padding, the alphabet used for tokens that travel
//! in headers and query strings.

use base64::{engine::general_purpose, Engine as _};

/// Encode bytes to a base64url string (no padding).
pub fn b64u_encode(content: impl AsRef<[u8]>) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(content)
}

/// Decode a base64url string (no padding) to bytes.
pub fn b64u_decode(b64u: &str) -> Result<Vec<u8>, Error> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(b64u)
        .map_err(|_| Error::FailToB64uDecode(b64u.len()))
}

// region:    --- Error
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Input of the given length is not valid base64url.
    FailToB64uDecode(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_url_safe_without_padding() {
        let encoded = b64u_encode([0xfb, 0xff, 0xfe]);
        assert_eq!(encoded, "-__-");
        assert!(!b64u_encode(b"ab").contains('='));
    }

    #[test]
    fn test_decode_rejects_standard_alphabet() {
        assert_eq!(b64u_decode("+//+"), Err(Error::FailToB64uDecode(4)));
        assert_eq!(b64u_decode("-__-").unwrap(), vec![0xfb, 0xff, 0xfe]);
    }
}
