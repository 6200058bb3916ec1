//! Reversible encoding of host filesystem paths into URL path segments.
//!
//! A path is percent-encoded first, then base64-encoded with the URL-safe
//! alphabet, so a token never contains a literal `/`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("`{token}` is not a valid path token: {message}")]
    Base64 { token: String, message: String },
    #[error("`{token}` does not decode to UTF-8 text")]
    Utf8 { token: String },
    #[error("`{token}` does not hold a valid percent-encoded path")]
    Percent { token: String },
}

/// Collapse `path` into one opaque token (mounted roots, selected files).
pub fn encode(path: &str) -> String {
    URL_SAFE.encode(urlencoding::encode(path).as_bytes())
}

pub fn decode(token: &str) -> Result<String, CodecError> {
    let bytes = URL_SAFE.decode(token).map_err(|err| CodecError::Base64 {
        token: token.to_string(),
        message: err.to_string(),
    })?;
    let escaped = String::from_utf8(bytes).map_err(|_| CodecError::Utf8 {
        token: token.to_string(),
    })?;
    urlencoding::decode(&escaped)
        .map(|path| path.into_owned())
        .map_err(|_| CodecError::Percent {
            token: token.to_string(),
        })
}

/// Encode each `/`-separated segment on its own, keeping separators visible.
pub fn encode_segments(path: &str) -> String {
    path.split('/').map(encode).collect::<Vec<_>>().join("/")
}

pub fn decode_segments(encoded: &str) -> Result<String, CodecError> {
    let parts = encoded
        .split('/')
        .map(decode)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_path_is_empty_token() {
        assert_eq!(encode(""), "");
        assert_eq!(decode("").unwrap(), "");
        assert_eq!(encode_segments(""), "");
    }

    #[test]
    fn token_has_no_separator() {
        let token = encode("/home/user/projects/a b/%2F?x=1");
        assert!(!token.contains('/'));
        assert!(!token.contains('?'));
        assert_eq!(decode(&token).unwrap(), "/home/user/projects/a b/%2F?x=1");
    }

    #[test]
    fn segments_keep_separators() {
        let encoded = encode_segments("/data/db");
        assert_eq!(encoded.split('/').count(), 3);
        assert!(encoded.starts_with('/'));
        assert_eq!(decode_segments(&encoded).unwrap(), "/data/db");
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(decode("not base64!"), Err(CodecError::Base64 { .. })));
        let token = URL_SAFE.encode([0xff, 0xfe]);
        assert!(matches!(decode(&token), Err(CodecError::Utf8 { .. })));
    }

    proptest! {
        #[test]
        fn round_trip(path in "[\\PC/]{0,64}") {
            prop_assert_eq!(decode(&encode(&path)).unwrap(), path);
        }

        #[test]
        fn segment_round_trip(path in "[\\PC/]{0,64}") {
            let encoded = encode_segments(&path);
            prop_assert_eq!(encoded.split('/').count(), path.split('/').count());
            prop_assert!(!encode(&path).contains('/'));
            prop_assert_eq!(decode_segments(&encoded).unwrap(), path);
        }
    }
}
