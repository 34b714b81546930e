use serde::{Deserialize, Serialize};
use std::time::Duration;
use visionbot_core::config::PollingConfig;
use visionbot_core::types::{EnvelopeStatus, StatusEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub delay: Duration,

    // Polls after the first one; a budget of `n` allows `n + 1` attempts.
    pub tries: u32,

    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(cfg: &PollingConfig) -> Self {
        Self {
            delay: Duration::from_millis(cfg.delay_ms),
            tries: cfg.tries,
            deadline: cfg.deadline_ms.map(Duration::from_millis),
        }
    }
}

/// Loop-local state for one job. Dropped when the loop exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    job_id: String,
    remaining: u32,
    delay: Duration,
    attempts: u32,
}

impl PollState {
    pub fn new(job_id: impl Into<String>, policy: &PollPolicy) -> Self {
        Self {
            job_id: job_id.into(),
            remaining: policy.tries,
            delay: policy.delay,
            attempts: 0,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Records a finished poll and reports whether another one is allowed.
    pub fn finish_attempt(&mut self) -> bool {
        self.attempts += 1;
        match self.remaining.checked_sub(1) {
            Some(left) => {
                self.remaining = left;
                true
            }
            None => false,
        }
    }
}

/// Progress notification for UI/log consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PollEvent {
    Submitted { job_id: String },
    Polled { attempt: u32, status: EnvelopeStatus },
}

/// Diagnostic result of one recognition request.
///
/// Every variant except `Recognized` collapses to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecognitionOutcome {
    Recognized {
        envelope: StatusEnvelope,
        polls: u32,
    },
    /// Submission did not come back `ok`; nothing was polled.
    Rejected { envelope: StatusEnvelope },
    ServerError {
        envelope: StatusEnvelope,
        polls: u32,
    },
    Exhausted {
        last: StatusEnvelope,
        polls: u32,
    },
    Cancelled,
    TimedOut { after_ms: u64 },
}

impl RecognitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RecognitionOutcome::Recognized { .. })
    }

    /// Poll requests issued, when known.
    pub fn polls(&self) -> Option<u32> {
        match self {
            RecognitionOutcome::Recognized { polls, .. }
            | RecognitionOutcome::ServerError { polls, .. }
            | RecognitionOutcome::Exhausted { polls, .. } => Some(*polls),
            RecognitionOutcome::Rejected { .. } => Some(0),
            RecognitionOutcome::Cancelled | RecognitionOutcome::TimedOut { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecognitionOutcome::Recognized { .. } => "recognized",
            RecognitionOutcome::Rejected { .. } => "rejected",
            RecognitionOutcome::ServerError { .. } => "server_error",
            RecognitionOutcome::Exhausted { .. } => "exhausted",
            RecognitionOutcome::Cancelled => "cancelled",
            RecognitionOutcome::TimedOut { .. } => "timed_out",
        }
    }

    pub fn text(&self) -> String {
        match self {
            RecognitionOutcome::Recognized { envelope, .. } => envelope.combined_result(),
            _ => String::new(),
        }
    }

    /// `(text, is_success)` for callers that only print one of two messages.
    pub fn into_result(self) -> (String, bool) {
        let ok = self.is_success();
        (self.text(), ok)
    }
}

pub fn ms(d: Duration) -> u64 {
    d.as_millis().try_into().unwrap_or(u64::MAX)
}
