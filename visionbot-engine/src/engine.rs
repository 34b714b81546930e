use crate::session::{PollEvent, PollPolicy, PollState, RecognitionOutcome, ms};
use crate::traits::RecognitionBackend;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use visionbot_core::types::{EnvelopeStatus, RecognitionOptions};

/// Submits an image and polls for its result.
///
/// Holds no per-request state, so one instance can serve concurrent requests.
#[derive(Clone)]
pub struct Recognizer {
    backend: Arc<dyn RecognitionBackend>,
}

impl Recognizer {
    pub fn new(backend: Arc<dyn RecognitionBackend>) -> Self {
        Self { backend }
    }

    /// Returns `"<text>\r\n<qr>"`, or an empty string when nothing was recognized.
    pub async fn describe(
        &self,
        image: &[u8],
        options: &RecognitionOptions,
        policy: &PollPolicy,
    ) -> String {
        self.recognize(image, options, policy).await.text()
    }

    pub async fn recognize(
        &self,
        image: &[u8],
        options: &RecognitionOptions,
        policy: &PollPolicy,
    ) -> RecognitionOutcome {
        self.recognize_with_hook(image, options, policy, |_event| async {})
            .await
    }

    /// Same as `recognize`, but emits a [`PollEvent`] after submission and after each poll.
    ///
    /// The hook runs inline with the loop and must be fast.
    pub async fn recognize_with_hook<F, Fut>(
        &self,
        image: &[u8],
        options: &RecognitionOptions,
        policy: &PollPolicy,
        on_event: F,
    ) -> RecognitionOutcome
    where
        F: Fn(PollEvent) -> Fut,
        Fut: Future<Output = ()>,
    {
        self.recognize_until(image, options, policy, on_event, std::future::pending())
            .await
    }

    /// Runs until a terminal outcome, the policy deadline, or `cancel` resolves.
    ///
    /// An in-flight request is dropped on cancellation or timeout.
    pub async fn recognize_until<F, Fut, C>(
        &self,
        image: &[u8],
        options: &RecognitionOptions,
        policy: &PollPolicy,
        on_event: F,
        cancel: C,
    ) -> RecognitionOutcome
    where
        F: Fn(PollEvent) -> Fut,
        Fut: Future<Output = ()>,
        C: Future<Output = ()>,
    {
        let t0 = Instant::now();
        let run = self.run(image, options, policy, &on_event);

        let bounded = async {
            match policy.deadline {
                Some(limit) => match tokio::time::timeout(limit, run).await {
                    Ok(outcome) => outcome,
                    Err(_) => RecognitionOutcome::TimedOut { after_ms: ms(limit) },
                },
                None => run.await,
            }
        };

        let outcome = tokio::select! {
            outcome = bounded => outcome,
            _ = cancel => RecognitionOutcome::Cancelled,
        };

        log::info!(
            "recognition finished: outcome={} polls={:?} elapsed={}ms",
            outcome.label(),
            outcome.polls(),
            ms(t0.elapsed())
        );
        outcome
    }

    async fn run<F, Fut>(
        &self,
        image: &[u8],
        options: &RecognitionOptions,
        policy: &PollPolicy,
        on_event: &F,
    ) -> RecognitionOutcome
    where
        F: Fn(PollEvent) -> Fut,
        Fut: Future<Output = ()>,
    {
        // 1) Submit once; anything but `ok` ends the request.
        let submitted = self.backend.submit(image, options).await;
        if submitted.status() != EnvelopeStatus::Ok {
            log::warn!(
                "submission rejected: status={:?} text={:?}",
                submitted.status,
                submitted.text
            );
            return RecognitionOutcome::Rejected {
                envelope: submitted,
            };
        }
        let job_id = match submitted.job_id() {
            Some(id) => id.to_string(),
            None => {
                log::warn!("submission accepted without a job id");
                return RecognitionOutcome::Rejected {
                    envelope: submitted,
                };
            }
        };

        log::info!(
            "submitted {} bytes as job {job_id} (mode={}, lang={})",
            image.len(),
            options.mode,
            options.lang
        );
        let mut state = PollState::new(job_id.clone(), policy);
        on_event(PollEvent::Submitted { job_id }).await;

        // 2) Poll at a fixed delay until a terminal status or the budget runs out.
        loop {
            tokio::time::sleep(state.delay()).await;
            let envelope = self.backend.poll(state.job_id()).await;
            let more = state.finish_attempt();
            let status = envelope.status();
            let polls = state.attempts();

            log::debug!(
                "poll {polls} for job {}: status={:?} remaining={}",
                state.job_id(),
                envelope.status,
                state.remaining()
            );
            on_event(PollEvent::Polled {
                attempt: polls,
                status,
            })
            .await;

            match status {
                EnvelopeStatus::Ok => return RecognitionOutcome::Recognized { envelope, polls },
                EnvelopeStatus::Error => {
                    log::warn!("job {} failed: {:?}", state.job_id(), envelope.text);
                    return RecognitionOutcome::ServerError { envelope, polls };
                }
                EnvelopeStatus::Pending if !more => {
                    log::warn!("job {} still pending after {polls} polls", state.job_id());
                    return RecognitionOutcome::Exhausted {
                        last: envelope,
                        polls,
                    };
                }
                EnvelopeStatus::Pending => {}
            }
        }
    }
}
