//! Registration API.
//!
//! Registration is two-step: a constructor validates the action's description
//! and returns a handle, and applying the handle to an implementation inserts
//! the action into a [`Registry`]. A handle can be applied once.
//!
//! ```rust,ignore
//! let mut hello = register_callback_action("hello", "Say Hello", "hw", "Say hello.")
//!     .schema(json!({"type": "object"}));
//! hello.register(registry, hello_action)?;
//! ```

use crate::action::{Action, BuildContext, TagSet, TemplateBuilder};
use crate::callback_task::{self, CallbackTaskSpec};
use crate::error::{ActionsError, Result};
use crate::parameters::Parameters;
use crate::registry::{callback_identifier, ActionCallback, Registry};
use serde::Serialize;
use serde_json::Value;
use std::panic::Location;
use std::sync::Arc;
use tracing::debug;

/// Default `order` for callback actions.
pub const DEFAULT_CALLBACK_ORDER: i64 = 10_000;

pub const MAX_SYMBOL_LEN: usize = 25;

fn non_empty(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ActionsError::InvalidField {
            field,
            reason: "must be a non-empty string".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn check_schema(schema: &Option<Value>) -> Result<()> {
    match schema {
        None | Some(Value::Object(_)) | Some(Value::Bool(_)) => Ok(()),
        Some(other) => Err(ActionsError::InvalidField {
            field: "schema",
            reason: format!("must be a JSON schema object or boolean, got {other}"),
        }),
    }
}

fn is_empty_template(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Source file of a registration as a path inside its crate.
///
/// Inside a workspace the compiler reports paths relative to the workspace
/// root and they are kept. Absolute paths (a crate built from the registry or
/// a vendored checkout) are cut back to start at their last `src/` directory.
fn crate_relative_source(file: &str) -> String {
    let file = file.replace('\\', "/");
    let absolute = file.starts_with('/') || file.as_bytes().get(1) == Some(&b':');
    if !absolute {
        return file;
    }
    match file.rfind("/src/") {
        Some(at) => file[at + 1..].to_string(),
        None => file.rsplit('/').next().unwrap_or(file.as_str()).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Task actions
// ---------------------------------------------------------------------------

/// Describe an action whose task template is produced by a builder function.
///
/// Most actions should use [`register_callback_action`] instead; this is the
/// raw form for actions that create an arbitrary task.
///
/// `schema`, when given, must be a JSON schema document: an object, or `true`
/// / `false`. Any other JSON value is rejected with
/// [`ActionsError::InvalidField`] even though it would serialize.
pub fn register_task_action(
    name: &str,
    title: &str,
    description: &str,
    order: i64,
    context: Vec<TagSet>,
    schema: Option<Value>,
) -> Result<TaskActionRegistration> {
    check_schema(&schema)?;
    Ok(TaskActionRegistration {
        name: non_empty("name", name)?,
        title: non_empty("title", title)?,
        description: non_empty("description", description)?,
        order,
        context,
        schema,
        registered: false,
    })
}

#[derive(Debug)]
pub struct TaskActionRegistration {
    name: String,
    title: String,
    description: String,
    order: i64,
    context: Vec<TagSet>,
    schema: Option<Value>,
    registered: bool,
}

impl TaskActionRegistration {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add the action to `registry` with `builder` as its template builder.
    ///
    /// The builder may return any serializable value. A value that cannot be
    /// represented as JSON is reported as [`ActionsError::TaskNotJson`] when
    /// the manifest is rendered. `None` and empty values (`null`, `false`, `0`,
    /// `""`, `[]`, `{}`) leave the action out of the manifest.
    pub fn register<F, T>(&mut self, registry: &mut Registry, builder: F) -> Result<()>
    where
        F: Fn(&BuildContext<'_>) -> Result<Option<T>> + Send + Sync + 'static,
        T: Serialize,
    {
        if self.registered {
            return Err(ActionsError::AlreadyRegistered(self.name.clone()));
        }

        let action_name = self.name.clone();
        let template_builder: TemplateBuilder = Arc::new(move |ctx: &BuildContext<'_>| {
            let Some(task) = builder(ctx)? else {
                return Ok(None);
            };
            let value = serde_json::to_value(&task).map_err(|source| ActionsError::TaskNotJson {
                action: action_name.clone(),
                source,
            })?;
            Ok((!is_empty_template(&value)).then_some(value))
        });

        registry.push_action(Action {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            order: self.order,
            context: self.context.clone(),
            schema: self.schema.clone(),
            template_builder,
        })?;
        self.registered = true;
        debug!(action = %self.name, order = self.order, "registered task action");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Callback actions
// ---------------------------------------------------------------------------

type Availability = Arc<dyn Fn(&Parameters) -> bool + Send + Sync>;

/// Describe an action implemented by an in-tree callback.
///
/// `symbol` is the treeherder symbol of the task that runs the callback,
/// usually a 1-3 letter abbreviation of the title.
pub fn register_callback_action(
    name: &str,
    title: &str,
    symbol: &str,
    description: &str,
) -> CallbackActionRegistration {
    CallbackActionRegistration {
        name: name.to_string(),
        title: title.to_string(),
        symbol: symbol.to_string(),
        description: description.to_string(),
        order: DEFAULT_CALLBACK_ORDER,
        context: Vec::new(),
        available: Arc::new(|_: &Parameters| true),
        schema: None,
        registered: false,
    }
}

pub struct CallbackActionRegistration {
    name: String,
    title: String,
    symbol: String,
    description: String,
    order: i64,
    context: Vec<TagSet>,
    available: Availability,
    schema: Option<Value>,
    registered: bool,
}

impl CallbackActionRegistration {
    pub fn order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn context(mut self, context: Vec<TagSet>) -> Self {
        self.context = context;
        self
    }

    /// Only offer the action when `available` holds for the run parameters.
    pub fn available<P>(mut self, available: P) -> Self
    where
        P: Fn(&Parameters) -> bool + Send + Sync + 'static,
    {
        self.available = Arc::new(available);
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Register `callback` and a task action whose task runs it.
    ///
    /// The callback is keyed by its function name, which must be unique
    /// across the registry.
    #[track_caller]
    pub fn register<F>(&mut self, registry: &mut Registry, callback: F) -> Result<()>
    where
        F: ActionCallback + 'static,
    {
        let source_path = crate_relative_source(Location::caller().file());

        let callback_name = callback_identifier::<F>()?;
        let symbol_len = self.symbol.chars().count();
        if !(1..=MAX_SYMBOL_LEN).contains(&symbol_len) {
            return Err(ActionsError::InvalidSymbol(self.symbol.clone()));
        }
        if self.registered {
            return Err(ActionsError::AlreadyRegistered(self.name.clone()));
        }
        if registry.has_callback(&callback_name) {
            return Err(ActionsError::DuplicateCallback(callback_name));
        }

        let mut task_action = register_task_action(
            &self.name,
            &self.title,
            &self.description,
            self.order,
            self.context.clone(),
            self.schema.clone(),
        )?;

        let spec = CallbackTaskSpec {
            name: task_action.name.clone(),
            title: task_action.title.clone(),
            symbol: self.symbol.clone(),
            description: task_action.description.clone(),
            callback: callback_name.clone(),
            source_path,
        };
        let available = Arc::clone(&self.available);
        task_action.register(registry, move |ctx: &BuildContext<'_>| {
            if !available(ctx.parameters) {
                return Ok(None);
            }
            callback_task::build(&spec, ctx).map(Some)
        })?;

        registry.insert_callback(callback_name.clone(), Arc::new(callback))?;
        self.registered = true;
        debug!(action = %self.name, callback = %callback_name, "registered callback action");
        Ok(())
    }
}
