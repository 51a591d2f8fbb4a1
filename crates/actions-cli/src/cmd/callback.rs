use actions_core::{ActionHost, CallbackInvocation};
use anyhow::{bail, Context};
use clap::Args;
use serde_json::{Map, Value};
use std::path::Path;

/// Values an action task passes through its environment. Everything except
/// the group id and callback name is JSON-encoded.
#[derive(Args)]
pub struct ActionCallbackArgs {
    /// Task group the callback runs in
    #[arg(long, env = "ACTION_TASK_GROUP_ID")]
    task_group_id: String,

    /// Callback identifier to run
    #[arg(long, env = "ACTION_CALLBACK")]
    callback: String,

    /// JSON-encoded id of the task the action targets, or null
    #[arg(long, env = "ACTION_TASK_ID")]
    task_id: Option<String>,

    /// JSON-encoded definition of the targeted task, or null
    #[arg(long, env = "ACTION_TASK")]
    task: Option<String>,

    /// JSON-encoded user input, or null
    #[arg(long, env = "ACTION_INPUT")]
    input: Option<String>,

    /// JSON-encoded decision parameters
    #[arg(long, env = "ACTION_PARAMETERS", default_value = "{}")]
    parameters: String,

    /// Run without submitting anything
    #[arg(long)]
    test: bool,
}

pub fn run(root: &Path, args: ActionCallbackArgs) -> anyhow::Result<()> {
    let host = ActionHost::for_root(root).context("failed to load callback task config")?;
    let invocation = invocation(args)?;
    let callback = invocation.callback.clone();
    host.trigger(invocation)
        .with_context(|| format!("action callback {callback} failed"))?;
    Ok(())
}

fn invocation(args: ActionCallbackArgs) -> anyhow::Result<CallbackInvocation> {
    let task_id = match decode("ACTION_TASK_ID", args.task_id.as_deref())? {
        None => None,
        Some(Value::String(id)) => Some(id),
        Some(other) => bail!("ACTION_TASK_ID must be a string or null, got {other}"),
    };
    let parameters = match decode("ACTION_PARAMETERS", Some(args.parameters.as_str()))? {
        Some(Value::Object(map)) => map,
        None => Map::new(),
        Some(other) => bail!("ACTION_PARAMETERS must be an object, got {other}"),
    };

    Ok(CallbackInvocation {
        task_group_id: args.task_group_id,
        task_id,
        task: decode("ACTION_TASK", args.task.as_deref())?,
        input: decode("ACTION_INPUT", args.input.as_deref())?,
        callback: args.callback,
        parameters,
        test: args.test,
    })
}

/// Unset, empty, and `null` all mean absent.
fn decode(name: &str, raw: Option<&str>) -> anyhow::Result<Option<Value>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let value: Value =
        serde_json::from_str(raw).with_context(|| format!("{name} is not valid JSON"))?;
    Ok(match value {
        Value::Null => None,
        value => Some(value),
    })
}
