use crate::output::print_json;
use actions_core::{io::atomic_write, ActionHost, Parameters};
use anyhow::Context;
use std::path::Path;

pub fn run(
    root: &Path,
    parameters: &Path,
    task_group_id: Option<&str>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let host = ActionHost::for_root(root).context("failed to load callback task config")?;
    let parameters = Parameters::load(parameters)
        .with_context(|| format!("failed to read parameters from {}", parameters.display()))?;
    let manifest = host
        .render(&parameters, task_group_id)
        .context("failed to render actions.json")?;

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&manifest)?;
            atomic_write(path, json.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), actions = manifest.actions.len(), "wrote actions.json");
            Ok(())
        }
        None => print_json(&manifest),
    }
}
