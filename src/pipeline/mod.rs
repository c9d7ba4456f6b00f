//! One summarization run: extract, bound, summarize, decode.

mod run;
mod service;
mod types;

pub use run::{InvalidTransition, RunEvent, RunState, transition};
pub use service::{SummaryApi, SummaryService};
pub use types::{PipelineError, SummaryOutcome};
