use async_trait::async_trait;

use crate::error::RxError;
use crate::run::RunStatus;

/// Remote operations exposed by the hosted assistant service.
///
/// The analyze and follow-up workflows are written against this trait so the
/// remote side can be scripted in tests without a network.
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Upload a file tagged for assistant consumption. Returns the remote
    /// file id; the file's lifetime is controlled by the hosted service.
    async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<String, RxError>;

    /// Create a fresh conversation thread. Returns the thread id.
    async fn create_thread(&self) -> Result<String, RxError>;

    /// Append a user message to a thread, optionally referencing a
    /// previously uploaded image file.
    async fn add_user_message(
        &self,
        thread_id: &str,
        text: &str,
        image_file_id: Option<&str>,
    ) -> Result<(), RxError>;

    /// Start an assistant run against a thread. Returns the run id.
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<String, RxError>;

    /// Fetch the current status of a run.
    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, RxError>;

    /// Fetch the text of the most recent message in a thread.
    async fn latest_message_text(&self, thread_id: &str) -> Result<String, RxError>;
}
