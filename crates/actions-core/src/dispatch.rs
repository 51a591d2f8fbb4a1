//! Invocation of registered callbacks from inside an action task.

use crate::error::{ActionsError, Result};
use crate::parameters::Parameters;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// A switch on a task-submission collaborator. In testing mode the
/// collaborator records what it would submit instead of submitting it.
pub trait SubmissionMode: Send + Sync {
    fn enable_testing(&self);
    fn is_testing(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct TestingSwitch {
    testing: AtomicBool,
}

impl TestingSwitch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionMode for TestingSwitch {
    fn enable_testing(&self) {
        self.testing.store(true, Ordering::SeqCst);
    }

    fn is_testing(&self) -> bool {
        self.testing.load(Ordering::SeqCst)
    }
}

/// The submission collaborators a callback creates work through. Callbacks
/// receive it on every invocation and must consult it before submitting.
#[derive(Clone, Copy)]
pub struct Submission<'a> {
    pub job_creation: &'a dyn SubmissionMode,
    pub orchestration_client: &'a dyn SubmissionMode,
}

impl<'a> Submission<'a> {
    pub fn new(
        job_creation: &'a dyn SubmissionMode,
        orchestration_client: &'a dyn SubmissionMode,
    ) -> Self {
        Self {
            job_creation,
            orchestration_client,
        }
    }

    /// True when either collaborator simulates instead of submitting.
    pub fn is_testing(&self) -> bool {
        self.job_creation.is_testing() || self.orchestration_client.is_testing()
    }

    fn enable_testing(&self) {
        self.job_creation.enable_testing();
        self.orchestration_client.enable_testing();
    }
}

/// Everything an action task hands to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackInvocation {
    pub task_group_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task: Option<Value>,
    #[serde(default)]
    pub input: Option<Value>,
    pub callback: String,
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub test: bool,
}

/// Look up `invocation.callback` and run it.
///
/// With `test` set, both submission collaborators are switched to testing
/// before the callback runs; the callback sees them through `submission`.
pub fn trigger_action_callback(
    registry: &Registry,
    invocation: CallbackInvocation,
    submission: Submission<'_>,
) -> Result<()> {
    let Some(callback) = registry.callback(&invocation.callback) else {
        return Err(ActionsError::UnknownCallback {
            callback: invocation.callback,
            known: registry.callback_names(),
        });
    };

    if invocation.test {
        warn!(callback = %invocation.callback, "running action callback in testing mode");
        submission.enable_testing();
    }

    let parameters = Parameters::from_json_map(invocation.parameters)?;
    info!(
        callback = %invocation.callback,
        task_group_id = %invocation.task_group_id,
        task_id = invocation.task_id.as_deref().unwrap_or("-"),
        "dispatching action callback"
    );
    callback
        .call(
            &parameters,
            invocation.input.as_ref(),
            &invocation.task_group_id,
            invocation.task_id.as_deref(),
            invocation.task.as_ref(),
            &submission,
        )
        .map_err(|source| ActionsError::Callback {
            callback: invocation.callback.clone(),
            source,
        })
}
