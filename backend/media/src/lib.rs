use bytes::Bytes;
use std::path::Path;
use tracing::info;

use rxlens_core::{AnalysisSession, RxError};

pub mod encode;
pub mod mime_detect;

pub use encode::{decode_base64, encode_base64, strip_data_uri};
pub use mime_detect::{detect_mime_type, is_image};

/// A captured prescription image ready for analysis.
///
/// Keeps the raw bytes (for upload) and derives the base64 text rendering
/// (for display/export) from the same buffer, so the two representations
/// cannot drift apart.
#[derive(Debug, Clone)]
pub struct ImageCapture {
    /// Where the capture came from (file name, or `data-uri`).
    pub source: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl ImageCapture {
    /// Load a capture from an image file on disk.
    pub async fn from_path(path: &Path) -> Result<Self, RxError> {
        let mime = detect_mime_type(path);
        if !is_image(mime) {
            return Err(RxError::Capture(format!(
                "{} is not an image file ({mime})",
                path.display()
            )));
        }

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| RxError::Capture(format!("{}: {e}", path.display())))?;

        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("capture")
            .to_string();

        info!(source = %source, mime = %mime, bytes = data.len(), "Loaded prescription image");

        Ok(Self {
            source,
            mime_type: mime.to_string(),
            data: Bytes::from(data),
        })
    }

    /// Ingest a browser-exported `data:<mime>;base64,<payload>` URI, the
    /// format a web capture surface hands over.
    pub fn from_data_uri(uri: &str) -> Result<Self, RxError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| RxError::Capture("not a data: URI".into()))?;
        let (header, _) = rest
            .split_once("base64,")
            .ok_or_else(|| RxError::Capture("data: URI is not base64-encoded".into()))?;

        let mime = header.trim_end_matches(';');
        let mime = if mime.is_empty() { "image/png" } else { mime };
        if !is_image(mime) {
            return Err(RxError::Capture(format!("data: URI is not an image ({mime})")));
        }

        let data = decode_base64(uri)?;

        Ok(Self {
            source: "data-uri".to_string(),
            mime_type: mime.to_string(),
            data: Bytes::from(data),
        })
    }

    /// Base64 text rendering of the captured bytes.
    pub fn to_base64(&self) -> String {
        encode_base64(&self.data)
    }

    /// Data-URI rendering, suitable for embedding in a display surface.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Start a fresh analysis session around this capture.
    pub fn begin_session(&self) -> AnalysisSession {
        AnalysisSession::new(
            self.source.clone(),
            self.mime_type.clone(),
            self.data.to_vec(),
            self.to_base64(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingests_data_uri() {
        let capture = ImageCapture::from_data_uri("data:image/png;base64,AQID").unwrap();
        assert_eq!(capture.mime_type, "image/png");
        assert_eq!(&capture.data[..], &[1, 2, 3]);
    }

    #[test]
    fn rejects_non_image_data_uri() {
        let result = ImageCapture::from_data_uri("data:application/pdf;base64,AQID");
        assert!(matches!(result, Err(RxError::Capture(_))));
    }

    #[test]
    fn rejects_plain_text_as_data_uri() {
        assert!(ImageCapture::from_data_uri("rx.jpg").is_err());
    }

    #[test]
    fn representations_stay_in_sync() {
        let capture = ImageCapture::from_data_uri("data:image/jpeg;base64,AQID").unwrap();
        assert_eq!(capture.to_data_uri(), "data:image/jpeg;base64,AQID");

        let session = capture.begin_session();
        assert_eq!(session.image_base64, capture.to_base64());
        assert_eq!(session.image_data, capture.data.to_vec());
    }
}
