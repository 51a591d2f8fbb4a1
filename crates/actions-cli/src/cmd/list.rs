use crate::output::{print_json, print_table};
use actions_core::ActionHost;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let host = ActionHost::for_root(root).context("failed to load callback task config")?;
    let registry = host.registry().context("failed to load actions")?;
    let actions = registry.sorted_actions();

    if json {
        let value = serde_json::json!({
            "actions": actions
                .iter()
                .map(|a| serde_json::json!({
                    "name": a.name,
                    "title": a.title,
                    "order": a.order,
                    "context": a.context,
                }))
                .collect::<Vec<_>>(),
            "callbacks": registry.callback_names(),
        });
        return print_json(&value);
    }

    if actions.is_empty() {
        println!("No actions registered.");
        return Ok(());
    }

    let rows: Vec<[String; 4]> = actions
        .iter()
        .map(|a| {
            let scope = if a.is_task_scoped() { "task" } else { "graph" };
            [
                a.name.clone(),
                a.order.to_string(),
                scope.to_string(),
                a.title.clone(),
            ]
        })
        .collect();
    print_table(["NAME", "ORDER", "SCOPE", "TITLE"], &rows);

    let callbacks = registry.callback_names();
    if !callbacks.is_empty() {
        println!();
        println!("Callbacks: {}", callbacks.join(", "));
    }
    Ok(())
}
