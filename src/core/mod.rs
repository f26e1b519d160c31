pub mod classifier;
pub mod dispatch;
pub mod lexicon;
pub mod prompts;
pub mod rejection;

pub use crate::domain::model::{Operation, ResponsePayload, Verdict, VerdictReason};
pub use crate::domain::ports::{AuditSink, Generation, TextGenerator};
pub use crate::utils::error::Result;
