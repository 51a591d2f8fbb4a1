//! The action entity.
//!
//! An `Action` is what a trigger surface (Treeherder, the CLI) sees: a name,
//! labels, an optional input schema, a context filter, and a template builder
//! that describes the task to create when the action is triggered.

use crate::config::CallbackTaskConfig;
use crate::error::Result;
use crate::image::ImageResolver;
use crate::parameters::Parameters;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Required task tags. An action with context `[{kind: build}, {kind: test}]`
/// applies to tasks tagged `kind=build` or `kind=test`.
pub type TagSet = BTreeMap<String, String>;

/// Builds the task template for an action, or `None` when the action is not
/// available for these parameters.
pub type TemplateBuilder = Arc<dyn Fn(&BuildContext<'_>) -> Result<Option<Value>> + Send + Sync>;

/// Everything a template builder may look at.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub parameters: &'a Parameters,
    /// Task group the created task joins.
    pub task_group_id: &'a str,
    pub config: &'a CallbackTaskConfig,
    pub images: &'a dyn ImageResolver,
}

#[derive(Clone)]
pub struct Action {
    pub name: String,
    pub title: String,
    /// Markdown.
    pub description: String,
    pub order: i64,
    /// Empty means the action applies to the whole task group.
    pub context: Vec<TagSet>,
    /// `None` means the action takes no input.
    pub schema: Option<Value>,
    pub(crate) template_builder: TemplateBuilder,
}

impl Action {
    pub fn build(&self, ctx: &BuildContext<'_>) -> Result<Option<Value>> {
        (self.template_builder)(ctx)
    }

    /// True if the action is bound to individual tasks rather than the group.
    pub fn is_task_scoped(&self) -> bool {
        !self.context.is_empty()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("order", &self.order)
            .field("context", &self.context)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
