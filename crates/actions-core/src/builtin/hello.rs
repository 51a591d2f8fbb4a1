use crate::dispatch::Submission;
use crate::error::Result;
use crate::parameters::Parameters;
use crate::register::register_callback_action;
use crate::registry::{CallbackResult, Registry};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HelloInput {
    #[serde(default = "default_greeting")]
    greeting: String,
    #[serde(default = "default_name")]
    name: String,
}

fn default_greeting() -> String {
    "Hello".to_string()
}

fn default_name() -> String {
    "world".to_string()
}

pub(crate) fn register(registry: &mut Registry) -> Result<()> {
    register_callback_action(
        "hello",
        "Say Hello",
        "hw",
        "Simple **proof-of-concept** callback action that says hello.\n\n\
         Only offered on try pushes.",
    )
    .available(|parameters: &Parameters| {
        parameters
            .project()
            .map(|project| project == "try")
            .unwrap_or(false)
    })
    .schema(json!({
        "type": "object",
        "properties": {
            "greeting": {
                "type": "string",
                "default": "Hello",
                "title": "Greeting",
                "description": "Word to greet with",
            },
            "name": {
                "type": "string",
                "default": "world",
                "title": "Name",
                "description": "Name to greet",
            },
        },
        "additionalProperties": false,
    }))
    .register(registry, hello_world_action)
}

pub fn hello_world_action(
    _parameters: &Parameters,
    input: Option<&Value>,
    _task_group_id: &str,
    _task_id: Option<&str>,
    _task: Option<&Value>,
    submission: &Submission<'_>,
) -> CallbackResult {
    let input: HelloInput = match input {
        Some(value) => serde_json::from_value(value.clone())?,
        None => HelloInput {
            greeting: default_greeting(),
            name: default_name(),
        },
    };
    info!(testing = submission.is_testing(), "{}, {}", input.greeting, input.name);
    Ok(())
}
