//! Run lifecycle as an explicit state machine.
//!
//! `Idle → Extracting → Summarizing → Done | Failed`. A finished run can be resubmitted, which
//! replaces its result, and any state can be reset to `Idle`.

use crate::extraction::ExtractionStrategy;
use thiserror::Error;

use super::{PipelineError, SummaryOutcome};

/// Lifecycle state of one run.
#[derive(Debug, Clone)]
pub enum RunState {
    /// Nothing submitted yet.
    Idle,
    /// Text is being acquired.
    Extracting {
        /// Strategy chosen for the file.
        strategy: ExtractionStrategy,
    },
    /// Bounded text has been sent to the model.
    Summarizing {
        /// Strategy used to acquire the text.
        strategy: ExtractionStrategy,
        /// Characters extracted before bounding.
        extracted_chars: usize,
        /// Whether the text was cut to the prompt bound.
        truncated: bool,
    },
    /// The run produced a summary.
    Done(SummaryOutcome),
    /// The run ended with an error.
    Failed(PipelineError),
}

impl RunState {
    /// Short state name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Extracting { .. } => "extracting",
            Self::Summarizing { .. } => "summarizing",
            Self::Done(_) => "done",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether the run has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }

    /// Whether work is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Extracting { .. } | Self::Summarizing { .. })
    }
}

/// Inputs that move a run between states.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A file was submitted and routed.
    Submitted(ExtractionStrategy),
    /// Non-empty text was extracted and bounded.
    Extracted {
        /// Characters extracted before bounding.
        extracted_chars: usize,
        /// Whether the text was cut to the prompt bound.
        truncated: bool,
    },
    /// The summary is available.
    Summarized(SummaryOutcome),
    /// A step failed.
    Failed(PipelineError),
    /// Discard any state.
    Reset,
}

impl RunEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Submitted(_) => "submitted",
            Self::Extracted { .. } => "extracted",
            Self::Summarized(_) => "summarized",
            Self::Failed(_) => "failed",
            Self::Reset => "reset",
        }
    }
}

/// Event not allowed in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply '{event}' while {state}")]
pub struct InvalidTransition {
    /// State the event was applied to.
    pub state: &'static str,
    /// Rejected event.
    pub event: &'static str,
}

/// Compute the next state. Pure; the input state is consumed.
pub fn transition(state: RunState, event: RunEvent) -> Result<RunState, InvalidTransition> {
    match (state, event) {
        (_, RunEvent::Reset) => Ok(RunState::Idle),
        (RunState::Idle | RunState::Done(_) | RunState::Failed(_), RunEvent::Submitted(strategy)) => {
            Ok(RunState::Extracting { strategy })
        }
        (
            RunState::Extracting { strategy },
            RunEvent::Extracted {
                extracted_chars,
                truncated,
            },
        ) => Ok(RunState::Summarizing {
            strategy,
            extracted_chars,
            truncated,
        }),
        (RunState::Summarizing { .. }, RunEvent::Summarized(outcome)) => {
            Ok(RunState::Done(outcome))
        }
        (RunState::Extracting { .. } | RunState::Summarizing { .. }, RunEvent::Failed(error)) => {
            Ok(RunState::Failed(error))
        }
        (state, event) => Err(InvalidTransition {
            state: state.name(),
            event: event.name(),
        }),
    }
}
