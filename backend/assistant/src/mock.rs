//! A scripted assistant service for exercising the workflows without a
//! network. Status checks consume a scripted sequence; once the script runs
//! dry the run reports `in_progress`, which is how a never-finishing run is
//! simulated.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use rxlens_core::{AssistantService, RunStatus, RxError};

/// One recorded call against the scripted service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Upload {
        file_name: String,
        mime_type: String,
        bytes: usize,
    },
    CreateThread,
    AddMessage {
        thread_id: String,
        text: String,
        image_file_id: Option<String>,
    },
    CreateRun {
        thread_id: String,
        assistant_id: String,
    },
    RunStatus {
        run_id: String,
    },
    FetchLatest {
        thread_id: String,
    },
}

impl RemoteCall {
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteCall::Upload { .. } => "upload",
            RemoteCall::CreateThread => "create_thread",
            RemoteCall::AddMessage { .. } => "add_message",
            RemoteCall::CreateRun { .. } => "create_run",
            RemoteCall::RunStatus { .. } => "run_status",
            RemoteCall::FetchLatest { .. } => "fetch_latest",
        }
    }
}

pub struct ScriptedAssistant {
    file_id: String,
    thread_id: String,
    run_id: String,
    statuses: Mutex<VecDeque<RunStatus>>,
    reply: Mutex<String>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self {
            file_id: "file_mock".to_string(),
            thread_id: "thread_mock".to_string(),
            run_id: "run_mock".to_string(),
            statuses: Mutex::new(VecDeque::new()),
            reply: Mutex::new(String::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file_id(mut self, id: impl Into<String>) -> Self {
        self.file_id = id.into();
        self
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        *self.reply.lock().unwrap() = reply.into();
        self
    }

    /// Swap the reply mid-test (e.g. between analysis and follow-up).
    pub fn set_reply(&self, reply: impl Into<String>) {
        *self.reply.lock().unwrap() = reply.into();
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of run-status checks issued so far.
    pub fn status_checks(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RemoteCall::RunStatus { .. }))
            .count()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for ScriptedAssistant {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantService for ScriptedAssistant {
    async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<String, RxError> {
        self.record(RemoteCall::Upload {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: data.len(),
        });
        Ok(self.file_id.clone())
    }

    async fn create_thread(&self) -> Result<String, RxError> {
        self.record(RemoteCall::CreateThread);
        Ok(self.thread_id.clone())
    }

    async fn add_user_message(
        &self,
        thread_id: &str,
        text: &str,
        image_file_id: Option<&str>,
    ) -> Result<(), RxError> {
        self.record(RemoteCall::AddMessage {
            thread_id: thread_id.to_string(),
            text: text.to_string(),
            image_file_id: image_file_id.map(str::to_string),
        });
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<String, RxError> {
        self.record(RemoteCall::CreateRun {
            thread_id: thread_id.to_string(),
            assistant_id: assistant_id.to_string(),
        });
        Ok(self.run_id.clone())
    }

    async fn run_status(&self, _thread_id: &str, run_id: &str) -> Result<RunStatus, RxError> {
        self.record(RemoteCall::RunStatus {
            run_id: run_id.to_string(),
        });
        let next = self.statuses.lock().unwrap().pop_front();
        Ok(next.unwrap_or(RunStatus::InProgress))
    }

    async fn latest_message_text(&self, thread_id: &str) -> Result<String, RxError> {
        self.record(RemoteCall::FetchLatest {
            thread_id: thread_id.to_string(),
        });
        Ok(self.reply.lock().unwrap().clone())
    }
}
