//! The `actions.json` manifest published for a task group.

use crate::action::{BuildContext, TagSet};
use crate::error::Result;
use crate::parameters::Parameters;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub variables: Variables,
    pub actions: Vec<ManifestAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    pub parameters: Parameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Task,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestAction {
    pub kind: ActionKind,
    pub name: String,
    pub title: String,
    pub description: String,
    pub context: Vec<TagSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    pub task: Value,
}

/// Render the manifest of actions available for `ctx.parameters`.
///
/// Actions are evaluated in ascending `order`; an action whose builder returns
/// `None` is left out. A builder error aborts rendering.
pub fn render_actions_json(registry: &Registry, ctx: &BuildContext<'_>) -> Result<Manifest> {
    let mut actions = Vec::new();
    for action in registry.sorted_actions() {
        let Some(task) = action.build(ctx)? else {
            debug!(action = %action.name, "action not available, skipping");
            continue;
        };
        actions.push(ManifestAction {
            kind: ActionKind::Task,
            name: action.name.clone(),
            title: action.title.clone(),
            description: action.description.clone(),
            context: action.context.clone(),
            schema: action.schema.clone(),
            task,
        });
    }
    Ok(Manifest {
        version: MANIFEST_VERSION,
        variables: Variables {
            parameters: ctx.parameters.clone(),
        },
        actions,
    })
}
