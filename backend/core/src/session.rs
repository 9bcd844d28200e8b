use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::prescription::Prescription;

/// Transient state for one capture → analyze → ask cycle.
///
/// A session owns its conversation thread: the thread is created remotely
/// when analysis starts and is never shared with another session, so
/// independent sessions cannot corrupt each other's conversation history.
/// Dropping the session discards everything; nothing is persisted.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,

    /// Where the capture came from (file path, or `data-uri`).
    pub image_name: String,
    pub image_mime: String,
    /// Raw captured bytes, uploaded to the hosted service.
    pub image_data: Vec<u8>,
    /// Base64 text rendering of the same bytes, kept in sync for display.
    pub image_base64: String,

    /// Remote file id once the image has been uploaded.
    pub file_id: Option<String>,
    /// The session's own conversation thread id.
    pub thread_id: Option<String>,

    pub prescription: Option<Prescription>,
    pub last_answer: Option<String>,
}

impl AnalysisSession {
    pub fn new(
        image_name: impl Into<String>,
        image_mime: impl Into<String>,
        image_data: Vec<u8>,
        image_base64: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            image_name: image_name.into(),
            image_mime: image_mime.into(),
            image_data,
            image_base64,
            file_id: None,
            thread_id: None,
            prescription: None,
            last_answer: None,
        }
    }

    /// Whether an analysis has completed for this session.
    pub fn is_analyzed(&self) -> bool {
        self.prescription.is_some()
    }
}
