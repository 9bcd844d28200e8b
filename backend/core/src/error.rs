use thiserror::Error;

/// Top-level error type for the RxLens workflows.
#[derive(Debug, Error)]
pub enum RxError {
    #[error("image capture failed: {0}")]
    Capture(String),

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("file upload rejected: {0}")]
    Upload(String),

    #[error("assistant run ended with status \"{status}\"")]
    RunFailed { status: String },

    #[error("assistant reply did not contain parseable prescription data")]
    Parse,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("run did not reach a terminal status within {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("no completed analysis to ask a question about")]
    QuestionContextMissing,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
