//! The analyze and follow-up workflows.
//!
//! Both workflows are strictly sequential: one remote call at a time, one
//! run at a time per session thread. Failures map onto the typed
//! [`RxError`] taxonomy at this boundary; no automatic retry happens here —
//! a failed workflow requires a fresh session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use rxlens_core::{AnalysisSession, AssistantService, Prescription, RunStatus, RxError};

use crate::parse::parse_reply;
use crate::poll::PollPolicy;

/// Instruction sent alongside the uploaded prescription image.
const ANALYZE_INSTRUCTION: &str = "Analyze this prescription image and extract every \
medicine along with why it is prescribed, keeping each use as short as possible. \
Reply with a JSON array of objects with \"Medicine\" and \"Use\" fields inside a \
```json fenced block.";

/// Drives the remote workflows against any [`AssistantService`].
pub struct Orchestrator {
    service: Arc<dyn AssistantService>,
    assistant_id: String,
    poll: PollPolicy,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn AssistantService>, assistant_id: impl Into<String>) -> Self {
        Self {
            service,
            assistant_id: assistant_id.into(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Run the full analysis workflow for a freshly captured session:
    /// upload the image, create the session thread, append the instruction
    /// message, run the assistant, poll to a terminal status, then fetch and
    /// parse the reply into a [`Prescription`].
    pub async fn analyze(&self, session: &mut AnalysisSession) -> Result<Prescription, RxError> {
        let file_id = self
            .service
            .upload_file(
                &session.image_name,
                &session.image_mime,
                session.image_data.clone(),
            )
            .await?;
        info!(session = %session.id, file_id = %file_id, "Prescription image uploaded");
        session.file_id = Some(file_id.clone());

        let thread_id = self.ensure_thread(session).await?;

        self.service
            .add_user_message(&thread_id, ANALYZE_INSTRUCTION, Some(&file_id))
            .await?;

        let status = self.run_to_terminal(&thread_id).await?;
        if status != RunStatus::Completed {
            return Err(RxError::RunFailed {
                status: status.as_str().to_string(),
            });
        }

        let reply = self.service.latest_message_text(&thread_id).await?;
        let prescription = parse_reply(&reply)?;
        info!(
            session = %session.id,
            medicines = prescription.medicines.len(),
            "Prescription analyzed"
        );
        session.prescription = Some(prescription.clone());
        Ok(prescription)
    }

    /// Ask a free-text question about a completed analysis. The answer is
    /// the assistant's latest message text, returned verbatim — no
    /// structured parsing.
    pub async fn ask_follow_up(
        &self,
        session: &mut AnalysisSession,
        question: &str,
    ) -> Result<String, RxError> {
        if !session.is_analyzed() {
            return Err(RxError::QuestionContextMissing);
        }
        let thread_id = session
            .thread_id
            .clone()
            .ok_or(RxError::QuestionContextMissing)?;

        self.service
            .add_user_message(&thread_id, question, None)
            .await?;

        let status = self.run_to_terminal(&thread_id).await?;
        if status != RunStatus::Completed {
            return Err(RxError::RunFailed {
                status: status.as_str().to_string(),
            });
        }

        let answer = self.service.latest_message_text(&thread_id).await?;
        session.last_answer = Some(answer.clone());
        Ok(answer)
    }

    /// Reuse the session's thread, creating it remotely on first use.
    async fn ensure_thread(&self, session: &mut AnalysisSession) -> Result<String, RxError> {
        if let Some(id) = &session.thread_id {
            return Ok(id.clone());
        }
        let id = self.service.create_thread().await?;
        debug!(session = %session.id, thread_id = %id, "Conversation thread created");
        session.thread_id = Some(id.clone());
        Ok(id)
    }

    /// Start a run and poll until it leaves the working states. No status
    /// check is issued after a terminal status is observed; exceeding the
    /// poll bound fails with [`RxError::Timeout`].
    async fn run_to_terminal(&self, thread_id: &str) -> Result<RunStatus, RxError> {
        let run_id = self.service.create_run(thread_id, &self.assistant_id).await?;
        debug!(run_id = %run_id, "Assistant run started");

        let mut attempts: u32 = 0;
        loop {
            let status = self.service.run_status(thread_id, &run_id).await?;
            if status.is_terminal() {
                debug!(run_id = %run_id, status = %status, polls = attempts, "Run reached terminal status");
                return Ok(status);
            }

            attempts += 1;
            if self.poll.exhausted(attempts) {
                warn!(run_id = %run_id, attempts, "Run never reached a terminal status, giving up");
                return Err(RxError::Timeout { attempts });
            }
            tokio::time::sleep(self.poll.delay_for(attempts)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{RemoteCall, ScriptedAssistant};
    use std::time::Duration;

    fn instant_poll() -> PollPolicy {
        PollPolicy::fixed(Duration::ZERO, 10)
    }

    fn session() -> AnalysisSession {
        AnalysisSession::new("rx.jpg", "image/jpeg", vec![0xFF, 0xD8], "/9g=".into())
    }

    fn orchestrator(service: Arc<ScriptedAssistant>) -> Orchestrator {
        Orchestrator::new(service, "asst_demo").with_poll_policy(instant_poll())
    }

    #[tokio::test]
    async fn analyze_happy_path_end_to_end() {
        // Scenario: upload yields file_123, run passes through queued before
        // completing, reply carries a fenced JSON block.
        let service = Arc::new(
            ScriptedAssistant::new()
                .with_file_id("file_123")
                .with_statuses([RunStatus::Queued, RunStatus::Completed])
                .with_reply("```json\n[{\"Medicine\":\"Amoxicillin\",\"Use\":\"infection\"}]\n```"),
        );
        let mut session = session();

        let prescription = orchestrator(Arc::clone(&service))
            .analyze(&mut session)
            .await
            .unwrap();

        assert_eq!(prescription.medicines.len(), 1);
        assert_eq!(prescription.medicines[0].name, "Amoxicillin");
        assert_eq!(prescription.medicines[0].indication, "infection");
        assert_eq!(session.file_id.as_deref(), Some("file_123"));
        assert!(session.is_analyzed());

        // The instruction message must reference the uploaded file.
        let calls = service.calls();
        assert!(calls.iter().any(|c| matches!(
            c,
            RemoteCall::AddMessage { image_file_id: Some(id), .. } if id == "file_123"
        )));
        // Exactly one status check per scripted status, none after terminal.
        assert_eq!(service.status_checks(), 2);
    }

    #[tokio::test]
    async fn analyze_sequences_remote_calls_strictly() {
        let service = Arc::new(
            ScriptedAssistant::new()
                .with_statuses([RunStatus::Completed])
                .with_reply("[{\"Medicine\":\"A\",\"Use\":\"b\"}]"),
        );
        let mut session = session();
        orchestrator(Arc::clone(&service))
            .analyze(&mut session)
            .await
            .unwrap();

        let kinds: Vec<&'static str> = service.calls().iter().map(RemoteCall::kind).collect();
        assert_eq!(
            kinds,
            [
                "upload",
                "create_thread",
                "add_message",
                "create_run",
                "run_status",
                "fetch_latest"
            ]
        );
    }

    #[tokio::test]
    async fn polling_stops_at_first_terminal_status() {
        let service = Arc::new(
            ScriptedAssistant::new()
                .with_statuses([RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed])
                .with_reply("[{\"Medicine\":\"A\",\"Use\":\"b\"}]"),
        );
        let mut session = session();
        orchestrator(Arc::clone(&service))
            .analyze(&mut session)
            .await
            .unwrap();

        assert_eq!(service.status_checks(), 3);
    }

    #[tokio::test]
    async fn failed_run_surfaces_status_after_two_working_polls() {
        // Scenario: two working statuses, then a failed terminal status.
        let service = Arc::new(ScriptedAssistant::new().with_statuses([
            RunStatus::InProgress,
            RunStatus::InProgress,
            RunStatus::Failed,
        ]));
        let mut session = session();

        let err = orchestrator(Arc::clone(&service))
            .analyze(&mut session)
            .await
            .unwrap_err();

        assert!(matches!(err, RxError::RunFailed { ref status } if status == "failed"));
        assert_eq!(service.status_checks(), 3);
        // The reply is never fetched for a failed run.
        assert!(!service
            .calls()
            .iter()
            .any(|c| matches!(c, RemoteCall::FetchLatest { .. })));
        assert!(!session.is_analyzed());
    }

    #[tokio::test]
    async fn every_non_completed_terminal_status_is_a_run_failure() {
        for status in [RunStatus::Failed, RunStatus::Cancelled, RunStatus::Expired] {
            let service =
                Arc::new(ScriptedAssistant::new().with_statuses([status.clone()]));
            let mut session = session();
            let err = orchestrator(service).analyze(&mut session).await.unwrap_err();
            assert!(
                matches!(err, RxError::RunFailed { status: ref s } if s == status.as_str())
            );
        }
    }

    #[tokio::test]
    async fn poll_bound_exhaustion_times_out() {
        // The scripted service keeps answering in_progress once the script
        // runs dry.
        let service = Arc::new(ScriptedAssistant::new().with_statuses([RunStatus::Queued]));
        let mut session = session();
        let orchestrator = Orchestrator::new(service.clone(), "asst_demo")
            .with_poll_policy(PollPolicy::fixed(Duration::ZERO, 3));

        let err = orchestrator.analyze(&mut session).await.unwrap_err();
        assert!(matches!(err, RxError::Timeout { attempts: 3 }));
        assert_eq!(service.status_checks(), 3);
    }

    #[tokio::test]
    async fn unparseable_reply_fails_without_partial_records() {
        let service = Arc::new(
            ScriptedAssistant::new()
                .with_statuses([RunStatus::Completed])
                .with_reply("I could not make out the handwriting."),
        );
        let mut session = session();
        let err = orchestrator(service).analyze(&mut session).await.unwrap_err();
        assert!(matches!(err, RxError::Parse));
        assert!(!session.is_analyzed());
    }

    #[tokio::test]
    async fn follow_up_returns_answer_verbatim() {
        let service = Arc::new(
            ScriptedAssistant::new()
                .with_statuses([RunStatus::Completed, RunStatus::Queued, RunStatus::Completed])
                .with_reply("[{\"Medicine\":\"A\",\"Use\":\"b\"}]"),
        );
        let mut session = session();
        let orchestrator = orchestrator(Arc::clone(&service));
        orchestrator.analyze(&mut session).await.unwrap();

        service.set_reply("Yes, these are commonly prescribed together. ```not data```");
        let answer = orchestrator
            .ask_follow_up(&mut session, "Can I take these together?")
            .await
            .unwrap();

        // Verbatim, unparsed.
        assert_eq!(answer, "Yes, these are commonly prescribed together. ```not data```");
        assert_eq!(session.last_answer.as_deref(), Some(answer.as_str()));

        // The question goes to the same session thread with no image.
        let calls = service.calls();
        assert!(calls.iter().any(|c| matches!(
            c,
            RemoteCall::AddMessage { text, image_file_id: None, .. }
                if text == "Can I take these together?"
        )));
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, RemoteCall::CreateThread))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn follow_up_without_analysis_is_rejected() {
        let service = Arc::new(ScriptedAssistant::new());
        let mut session = session();
        let err = orchestrator(Arc::clone(&service))
            .ask_follow_up(&mut session, "Is this safe?")
            .await
            .unwrap_err();
        assert!(matches!(err, RxError::QuestionContextMissing));
        // Nothing was sent remotely.
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn follow_up_run_failure_surfaces_status() {
        let service = Arc::new(
            ScriptedAssistant::new()
                .with_statuses([RunStatus::Completed, RunStatus::Cancelled])
                .with_reply("[{\"Medicine\":\"A\",\"Use\":\"b\"}]"),
        );
        let mut session = session();
        let orchestrator = orchestrator(service);
        orchestrator.analyze(&mut session).await.unwrap();

        let err = orchestrator
            .ask_follow_up(&mut session, "Any side effects?")
            .await
            .unwrap_err();
        assert!(matches!(err, RxError::RunFailed { ref status } if status == "cancelled"));
    }
}
