//! Base64 codec for captured images.
//!
//! Encoding is deterministic and infallible; decoding accepts either bare
//! base64 text or a full `data:` URI and strips the scheme prefix first.

use base64::{Engine, engine::general_purpose::STANDARD};

use rxlens_core::RxError;

/// Encode raw bytes as standard base64 text.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Strip an optional `data:<mime>;base64,` prefix, returning the bare payload.
pub fn strip_data_uri(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("data:") {
        if let Some((_, payload)) = rest.split_once("base64,") {
            return payload;
        }
    }
    text
}

/// Decode base64 text (bare or data-URI) back into bytes.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, RxError> {
    let payload = strip_data_uri(text.trim());
    STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| RxError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_deterministic() {
        let data = b"prescription scan bytes";
        assert_eq!(encode_base64(data), encode_base64(data));
    }

    #[test]
    fn decode_inverts_encode() {
        let data = vec![0u8, 1, 2, 254, 255];
        assert_eq!(decode_base64(&encode_base64(&data)).unwrap(), data);
    }

    #[test]
    fn strips_data_uri_prefix() {
        assert_eq!(strip_data_uri("data:image/jpeg;base64,AQID"), "AQID");
        assert_eq!(strip_data_uri("AQID"), "AQID");
    }

    #[test]
    fn decodes_full_data_uri() {
        assert_eq!(decode_base64("data:image/png;base64,AQID").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn malformed_text_fails_with_decode_error() {
        assert!(matches!(decode_base64("not base64!!"), Err(RxError::Decode(_))));
    }
}
