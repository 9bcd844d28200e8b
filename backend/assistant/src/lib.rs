//! Hosted-assistant orchestration for RxLens.
//!
//! Drives the analysis workflow (upload image, create thread, append
//! instruction message, run, poll to terminal, fetch and parse the reply)
//! and the follow-up question workflow against any
//! [`rxlens_core::AssistantService`] implementation.

pub mod mock;
pub mod openai;
pub mod orchestrator;
pub mod parse;
pub mod poll;

pub use openai::OpenAiAssistant;
pub use orchestrator::Orchestrator;
pub use poll::PollPolicy;
