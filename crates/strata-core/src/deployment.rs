use serde_json::Value;
use strata_schema::{Description, DeploymentIntent, EnvId, RequestContext, SessionId};
use strata_store::TaskQueue;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("deployment submission failed: {0}")]
pub struct SubmissionError(pub String);

/// Hands deployment intents to an orchestration engine.
///
/// Submission is fire-and-forget: the outcome is reported later through
/// [`crate::SessionService::finish`].
pub trait DeploymentSubmitter: Send + Sync {
    fn submit(&self, intent: &DeploymentIntent, ctx: &RequestContext)
        -> Result<(), SubmissionError>;
}

impl DeploymentSubmitter for TaskQueue {
    fn submit(
        &self,
        intent: &DeploymentIntent,
        ctx: &RequestContext,
    ) -> Result<(), SubmissionError> {
        self.enqueue(intent.clone(), ctx.clone())
            .map(|_| ())
            .map_err(|e| SubmissionError(e.to_string()))
    }
}

/// What the orchestrator reports once it is done with a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentOutcome {
    Succeeded,
    Failed,
}

/// Build the intent for a session's plaintext draft. A draft without objects
/// asks for the environment to be torn down.
pub fn intent_for(env_id: EnvId, session_id: SessionId, draft: &Value) -> DeploymentIntent {
    if Description::new(draft.clone()).is_deletion() {
        DeploymentIntent::delete(env_id, session_id)
    } else {
        DeploymentIntent::deploy(env_id, session_id)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Submitter that records every intent it is given.
    #[derive(Default)]
    pub struct RecordingSubmitter {
        pub submitted: Mutex<Vec<DeploymentIntent>>,
        pub reject: AtomicBool,
    }

    impl RecordingSubmitter {
        pub fn rejecting() -> Self {
            let s = Self::default();
            s.reject.store(true, Ordering::SeqCst);
            s
        }

        pub fn intents(&self) -> Vec<DeploymentIntent> {
            self.submitted.lock().unwrap().clone()
        }
    }

    impl DeploymentSubmitter for RecordingSubmitter {
        fn submit(
            &self,
            intent: &DeploymentIntent,
            _ctx: &RequestContext,
        ) -> Result<(), SubmissionError> {
            if self.reject.load(Ordering::SeqCst) {
                return Err(SubmissionError("orchestrator unreachable".to_owned()));
            }
            self.submitted.lock().unwrap().push(intent.clone());
            Ok(())
        }
    }
}
