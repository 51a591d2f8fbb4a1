//! `ActionHost` owns the loaded registry together with the collaborators that
//! rendering and dispatch need. Build one at startup and pass it by reference.

use crate::action::BuildContext;
use crate::config::CallbackTaskConfig;
use crate::dispatch::{trigger_action_callback, CallbackInvocation, Submission, TestingSwitch};
use crate::error::Result;
use crate::image::{ImageResolver, InTreeImages};
use crate::loader::Loader;
use crate::manifest::{render_actions_json, Manifest};
use crate::parameters::Parameters;
use crate::registry::Registry;
use crate::slugid;
use std::path::Path;

pub struct ActionHost {
    loader: Loader,
    config: CallbackTaskConfig,
    images: Box<dyn ImageResolver>,
    job_creation: TestingSwitch,
    orchestration_client: TestingSwitch,
}

impl ActionHost {
    pub fn new(
        loader: Loader,
        config: CallbackTaskConfig,
        images: impl ImageResolver + 'static,
    ) -> Self {
        Self {
            loader,
            config,
            images: Box::new(images),
            job_creation: TestingSwitch::new(),
            orchestration_client: TestingSwitch::new(),
        }
    }

    /// Built-in actions, with config and docker images read from the tree at `root`.
    pub fn for_root(root: &Path) -> Result<Self> {
        let config = CallbackTaskConfig::load(root)?;
        Ok(Self::new(Loader::builtin(), config, InTreeImages::new(root)))
    }

    pub fn config(&self) -> &CallbackTaskConfig {
        &self.config
    }

    pub fn registry(&self) -> Result<&Registry> {
        self.loader.load()
    }

    /// Render the manifest for `parameters`.
    ///
    /// Callback tasks join `task_group_id` when given (the id of the task doing
    /// the rendering); otherwise a fresh group id is generated.
    pub fn render(&self, parameters: &Parameters, task_group_id: Option<&str>) -> Result<Manifest> {
        let registry = self.loader.load()?;
        let task_group_id = task_group_id
            .map(str::to_owned)
            .unwrap_or_else(slugid::nice);
        let ctx = BuildContext {
            parameters,
            task_group_id: &task_group_id,
            config: &self.config,
            images: self.images.as_ref(),
        };
        render_actions_json(registry, &ctx)
    }

    pub fn trigger(&self, invocation: CallbackInvocation) -> Result<()> {
        let registry = self.loader.load()?;
        trigger_action_callback(registry, invocation, self.submission())
    }

    /// Both switches, as handed to callbacks.
    pub fn submission(&self) -> Submission<'_> {
        Submission::new(&self.job_creation, &self.orchestration_client)
    }

    /// Switch consulted by the job-creation collaborator.
    pub fn job_creation(&self) -> &TestingSwitch {
        &self.job_creation
    }

    /// Switch consulted by the orchestration client.
    pub fn orchestration_client(&self) -> &TestingSwitch {
        &self.orchestration_client
    }

    /// Forget the loaded registry and submission modes.
    pub fn reset(&mut self) {
        self.loader.reset();
        self.job_creation = TestingSwitch::new();
        self.orchestration_client = TestingSwitch::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::SubmissionMode;
    use crate::parameters::sample;
    use serde_json::Value;
    use std::collections::BTreeMap;

    fn host() -> ActionHost {
        let images = |name: &str| -> Result<String> { Ok(format!("taskcluster/{name}:0.1")) };
        ActionHost::new(Loader::builtin(), CallbackTaskConfig::default(), images)
    }

    fn try_params() -> Parameters {
        let mut map: BTreeMap<String, Value> = sample().into();
        map.insert("project".into(), "try".into());
        map.insert("head_repository".into(), "https://hg.mozilla.org/try".into());
        Parameters::new(map).unwrap()
    }

    #[test]
    fn explicit_task_group_id_is_used() {
        let manifest = host().render(&try_params(), Some("decisionTaskId")).unwrap();
        let hello = manifest.actions.iter().find(|a| a.name == "hello").unwrap();
        assert_eq!(hello.task["taskGroupId"], "decisionTaskId");
        assert_eq!(hello.task["payload"]["image"], "taskcluster/decision:0.1");
    }

    #[test]
    fn fresh_task_group_id_when_absent() {
        let manifest = host().render(&try_params(), None).unwrap();
        let hello = manifest.actions.iter().find(|a| a.name == "hello").unwrap();
        assert_eq!(hello.task["taskGroupId"].as_str().unwrap().len(), 22);
    }

    #[test]
    fn hello_hidden_outside_try() {
        let manifest = host().render(&sample(), Some("g")).unwrap();
        assert!(manifest.actions.iter().all(|a| a.name != "hello"));
        assert!(manifest.actions.iter().any(|a| a.name == "retrigger-decision"));
    }

    #[test]
    fn trigger_in_test_mode_then_reset() {
        let mut host = host();
        let parameters: BTreeMap<String, Value> = try_params().into();
        host.trigger(CallbackInvocation {
            task_group_id: "g".into(),
            task_id: None,
            task: None,
            input: None,
            callback: "hello_world_action".into(),
            parameters: parameters.into_iter().collect(),
            test: true,
        })
        .unwrap();
        assert!(host.job_creation().is_testing());
        assert!(host.orchestration_client().is_testing());
        assert!(host.submission().is_testing());

        host.reset();
        assert!(!host.job_creation().is_testing());
        assert!(!host.submission().is_testing());
        assert_eq!(host.registry().unwrap().callback_names(), vec!["hello_world_action"]);
    }
}
