//! The task definition synthesized for callback actions.
//!
//! The task re-enters the action entry point with the `action-callback`
//! sub-command; the `ACTION_*` environment variables carry everything the
//! dispatcher needs to find and invoke the registered callback. Values of the
//! form `{"$eval": ...}` / `{"$json": ...}` are JSON-e expressions filled in by
//! the trigger surface when the action is triggered.

use crate::action::BuildContext;
use crate::error::{ActionsError, Result};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

const CHECKOUTS: &str = "/builds/worker/checkouts";
const ARTIFACTS: &str = "/builds/worker/artifacts";

/// Fixed attributes of one callback action, captured at registration.
#[derive(Debug, Clone)]
pub(crate) struct CallbackTaskSpec {
    pub name: String,
    pub title: String,
    pub symbol: String,
    pub description: String,
    pub callback: String,
    /// Source file that registered the action, used for task provenance.
    pub source_path: String,
}

static REPO_RE: OnceLock<Regex> = OnceLock::new();

fn repo_re() -> &'static Regex {
    REPO_RE.get_or_init(|| Regex::new(r"^https://(hg\.mozilla\.org)/(.*?)/?$").unwrap())
}

/// Scope granting the action task the repository's permissions.
pub fn repo_scope(head_repository: &str) -> Result<String> {
    let caps = repo_re()
        .captures(head_repository)
        .ok_or_else(|| ActionsError::UnrecognizedRepository(head_repository.to_string()))?;
    Ok(format!("assume:repo:{}/{}:*", &caps[1], &caps[2]))
}

pub(crate) fn build(spec: &CallbackTaskSpec, ctx: &BuildContext<'_>) -> Result<Value> {
    let params = ctx.parameters;
    let config = ctx.config;

    let head_repository = params.head_repository()?;
    let repo_scope = repo_scope(&head_repository)?;
    let head_rev = params.head_rev()?;
    let level = params.level()?;
    let project = params.project()?;
    let pushlog_id = params.pushlog_id()?;
    let task_group_id = ctx.task_group_id;
    let domain = &config.trust_domain;

    let image = ctx.images.resolve(&config.image)?;

    let mut cache = Map::new();
    cache.insert(
        format!("level-{level}-checkouts-sparse-v1"),
        Value::String(CHECKOUTS.to_string()),
    );

    let script = format!(
        "cd {CHECKOUTS}/gecko &&\nln -s {ARTIFACTS} artifacts &&\n{}",
        config.callback_command
    );

    Ok(json!({
        "created": { "$fromNow": "" },
        "deadline": { "$fromNow": config.deadline },
        "expires": { "$fromNow": config.expires },
        "metadata": {
            "owner": config.owner,
            "source": format!("{head_repository}/raw-file/{head_rev}/{}", spec.source_path),
            "name": format!("Action: {}", spec.title),
            "description": format!("Task executing callback for action.\n\n---\n{}", spec.description),
        },
        "workerType": format!("{domain}-{level}-decision"),
        "provisionerId": config.provisioner_id,
        "taskGroupId": task_group_id,
        "schedulerId": format!("{domain}-level-{level}"),
        "scopes": [repo_scope],
        "tags": {
            "createdForUser": params.owner()?,
            "kind": "action-callback",
        },
        "routes": [
            format!("tc-treeherder.v2.{project}.{head_rev}.{pushlog_id}"),
            format!("tc-treeherder-stage.v2.{project}.{head_rev}.{pushlog_id}"),
            format!("index.{domain}.v2.{project}.pushlog-id.{pushlog_id}.actions.${{ownTaskId}}"),
        ],
        "payload": {
            "env": {
                "GECKO_BASE_REPOSITORY": config.base_repository,
                "GECKO_HEAD_REPOSITORY": head_repository,
                "GECKO_HEAD_REF": params.head_ref()?,
                "GECKO_HEAD_REV": head_rev,
                "HG_STORE_PATH": format!("{CHECKOUTS}/hg-store"),
                "ACTION_TASK_GROUP_ID": task_group_id,
                "ACTION_TASK_ID": { "$json": { "$eval": "taskId" } },
                "ACTION_TASK": { "$json": { "$eval": "task" } },
                "ACTION_INPUT": { "$json": { "$eval": "input" } },
                "ACTION_CALLBACK": spec.callback,
                "ACTION_PARAMETERS": { "$json": { "$eval": "parameters" } },
                "TASKCLUSTER_CACHES": CHECKOUTS,
            },
            "artifacts": {
                "public": {
                    "type": "directory",
                    "path": ARTIFACTS,
                    "expires": { "$fromNow": config.expires },
                },
            },
            "cache": cache,
            "features": {
                "taskclusterProxy": true,
                "chainOfTrust": true,
            },
            "image": image,
            "maxRunTime": config.max_run_time,
            "command": [
                "/builds/worker/bin/run-task",
                format!("--vcs-checkout={CHECKOUTS}/gecko"),
                "--sparse-profile=build/sparse-profiles/taskgraph",
                "--",
                "bash",
                "-cx",
                script,
            ],
        },
        "extra": {
            "treeherder": {
                "groupName": "action-callback",
                "groupSymbol": "AC",
                "symbol": spec.symbol,
            },
            "parent": task_group_id,
            "action": {
                "name": spec.name,
                "context": {
                    "taskGroupId": task_group_id,
                    "taskId": { "$eval": "taskId" },
                    "input": { "$eval": "input" },
                    "parameters": { "$eval": "parameters" },
                },
            },
        },
    }))
}
