//! One-time loading of action sources into a [`Registry`].
//!
//! Sources are a static list: plugin functions that call the registration API,
//! and declarative YAML documents. The loader runs them the first time the
//! registry is read and hands out the same registry afterwards. Concurrent
//! first readers block until the single loading run finishes; a failed run
//! leaves nothing behind.

use crate::action::{Action, BuildContext, TagSet};
use crate::error::{ActionsError, Result};
use crate::register::register_task_action;
use crate::registry::{CallbackMap, Registry};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

pub type PluginFn = fn(&mut Registry) -> Result<()>;

#[derive(Debug, Clone, Copy)]
pub enum ActionSource {
    /// Rust code registering actions through the registration API.
    Plugin { name: &'static str, register: PluginFn },
    /// A two-document YAML stream: front-matter describing the action, then
    /// the task template returned verbatim for every set of parameters.
    Declarative {
        name: &'static str,
        document: &'static str,
    },
}

impl ActionSource {
    pub fn name(&self) -> &'static str {
        match self {
            ActionSource::Plugin { name, .. } | ActionSource::Declarative { name, .. } => name,
        }
    }

    fn apply(&self, registry: &mut Registry) -> Result<()> {
        match self {
            ActionSource::Plugin { register, .. } => register(registry),
            ActionSource::Declarative { name, document } => {
                register_declarative(registry, name, document)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Declarative sources
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Frontmatter {
    name: String,
    title: String,
    description: String,
    order: i64,
    #[serde(default)]
    context: Vec<TagSet>,
    #[serde(default)]
    schema: Option<Value>,
}

fn malformed(origin: &str, reason: impl ToString) -> ActionsError {
    ActionsError::MalformedSource {
        origin: origin.to_string(),
        reason: reason.to_string(),
    }
}

/// Register the action described by a declarative YAML document.
pub fn register_declarative(registry: &mut Registry, origin: &str, document: &str) -> Result<()> {
    let mut docs = Vec::new();
    for de in serde_yaml::Deserializer::from_str(document) {
        docs.push(serde_yaml::Value::deserialize(de).map_err(|e| malformed(origin, e))?);
    }
    let [front, template]: [serde_yaml::Value; 2] = docs.try_into().map_err(|docs: Vec<_>| {
        malformed(
            origin,
            format!(
                "expected front-matter and template documents, found {} document(s)",
                docs.len()
            ),
        )
    })?;

    let fm: Frontmatter = serde_yaml::from_value(front)
        .map_err(|e| malformed(origin, format!("front-matter: {e}")))?;
    let template: Value = serde_yaml::from_value(template)
        .map_err(|e| malformed(origin, format!("template is not JSON compatible: {e}")))?;

    register_task_action(
        &fm.name,
        &fm.title,
        &fm.description,
        fm.order,
        fm.context,
        fm.schema,
    )?
    .register(registry, move |_: &BuildContext<'_>| Ok(Some(template.clone())))
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Run every source against a fresh registry.
pub fn load_sources(sources: &[ActionSource]) -> Result<Registry> {
    let mut registry = Registry::new();
    for source in sources {
        if let Err(e) = source.apply(&mut registry) {
            error!(source = source.name(), error = %e, "failed to load action source");
            return Err(e);
        }
        debug!(source = source.name(), "loaded action source");
    }
    info!(
        actions = registry.actions().len(),
        callbacks = registry.callbacks().len(),
        "action registry loaded"
    );
    Ok(registry)
}

pub struct Loader {
    sources: Vec<ActionSource>,
    registry: OnceCell<Registry>,
}

impl Loader {
    pub fn new(sources: Vec<ActionSource>) -> Self {
        Self {
            sources,
            registry: OnceCell::new(),
        }
    }

    /// Loader over the actions shipped with this crate.
    pub fn builtin() -> Self {
        Self::new(crate::builtin::sources())
    }

    pub fn sources(&self) -> &[ActionSource] {
        &self.sources
    }

    /// The populated registry, loading it on first use.
    pub fn load(&self) -> Result<&Registry> {
        self.registry.get_or_try_init(|| load_sources(&self.sources))
    }

    pub fn is_loaded(&self) -> bool {
        self.registry.get().is_some()
    }

    pub fn callbacks(&self) -> Result<&CallbackMap> {
        Ok(self.load()?.callbacks())
    }

    pub fn actions(&self) -> Result<&[Action]> {
        Ok(self.load()?.actions())
    }

    /// Drop the loaded registry so the next read loads the sources again.
    pub fn reset(&mut self) {
        self.registry.take();
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::builtin()
    }
}
