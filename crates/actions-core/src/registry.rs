//! The action list and callback map that registration populates and the
//! renderer and dispatcher read.

use crate::action::Action;
use crate::dispatch::Submission;
use crate::error::{ActionsError, Result};
use crate::parameters::Parameters;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;
pub type CallbackResult = std::result::Result<(), CallbackError>;

/// Implementation behind a callback action, run inside the action task.
///
/// Arguments, in order: run parameters, the user's input (`None` when the
/// action has no schema), the task group the action was triggered for, the
/// task id and definition it was triggered on (`None` for group-wide actions),
/// and the submission collaborators to create work through.
pub trait ActionCallback: Send + Sync {
    fn call(
        &self,
        parameters: &Parameters,
        input: Option<&Value>,
        task_group_id: &str,
        task_id: Option<&str>,
        task: Option<&Value>,
        submission: &Submission<'_>,
    ) -> CallbackResult;
}

impl<F> ActionCallback for F
where
    F: Fn(
            &Parameters,
            Option<&Value>,
            &str,
            Option<&str>,
            Option<&Value>,
            &Submission<'_>,
        ) -> CallbackResult
        + Send
        + Sync,
{
    fn call(
        &self,
        parameters: &Parameters,
        input: Option<&Value>,
        task_group_id: &str,
        task_id: Option<&str>,
        task: Option<&Value>,
        submission: &Submission<'_>,
    ) -> CallbackResult {
        self(parameters, input, task_group_id, task_id, task, submission)
    }
}

/// Derive a callback identifier from the function's own name.
///
/// Only named function items qualify: closures and function pointers carry no
/// name and are rejected.
pub fn callback_identifier<F>() -> Result<String> {
    let full = std::any::type_name::<F>();
    let not_a_function = || ActionsError::NotAFunction(full.to_string());

    let pointer = ["fn(", "for<", "unsafe ", "extern "]
        .iter()
        .any(|prefix| full.starts_with(prefix));
    if pointer {
        return Err(not_a_function());
    }
    let path = strip_generic_args(full).ok_or_else(not_a_function)?;
    if path.contains(['{', '(', ' ', '&']) {
        return Err(not_a_function());
    }
    match path.rsplit("::").next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(not_a_function()),
    }
}

/// Remove every `<...>` group from a type path, nested ones included, so
/// `app::Jobs<Vec<u8>>::retrigger` becomes `app::Jobs::retrigger`. The `>` of
/// a `->` inside a group does not close it. `None` when brackets don't balance.
fn strip_generic_args(path: &str) -> Option<String> {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    let mut prev = None;
    for c in path.chars() {
        match c {
            '<' => depth += 1,
            '>' if prev == Some('-') => {}
            '>' => depth = depth.checked_sub(1)?,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
        prev = Some(c);
    }
    (depth == 0).then_some(out)
}

pub type CallbackMap = BTreeMap<String, Arc<dyn ActionCallback>>;

#[derive(Default)]
pub struct Registry {
    actions: Vec<Action>,
    callbacks: CallbackMap,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions in registration order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Actions ordered by `order`, registration order kept on ties.
    pub fn sorted_actions(&self) -> Vec<&Action> {
        let mut sorted: Vec<&Action> = self.actions.iter().collect();
        sorted.sort_by_key(|a| a.order);
        sorted
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn callbacks(&self) -> &CallbackMap {
        &self.callbacks
    }

    pub fn callback(&self, name: &str) -> Option<&Arc<dyn ActionCallback>> {
        self.callbacks.get(name)
    }

    pub fn callback_names(&self) -> Vec<String> {
        self.callbacks.keys().cloned().collect()
    }

    pub(crate) fn push_action(&mut self, action: Action) -> Result<()> {
        if self.action(&action.name).is_some() {
            return Err(ActionsError::DuplicateAction(action.name));
        }
        self.actions.push(action);
        Ok(())
    }

    pub(crate) fn has_callback(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    pub(crate) fn insert_callback(
        &mut self,
        name: String,
        callback: Arc<dyn ActionCallback>,
    ) -> Result<()> {
        if self.has_callback(&name) {
            return Err(ActionsError::DuplicateCallback(name));
        }
        self.callbacks.insert(name, callback);
        Ok(())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("actions", &self.actions)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}
