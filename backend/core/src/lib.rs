pub mod error;
pub mod prescription;
pub mod run;
pub mod service;
pub mod session;

pub use error::RxError;
pub use prescription::{Medicine, Prescription};
pub use run::RunStatus;
pub use service::AssistantService;
pub use session::AnalysisSession;
