use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TASKCLUSTER_DIR: &str = "taskcluster";
pub const DOCKER_DIR: &str = "taskcluster/docker";

pub const CONFIG_FILE: &str = "taskcluster/actions.yml";

pub const REGISTRY_FILE: &str = "REGISTRY";
pub const VERSION_FILE: &str = "VERSION";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn docker_dir(root: &Path) -> PathBuf {
    root.join(DOCKER_DIR)
}

pub fn image_dir(root: &Path, name: &str) -> PathBuf {
    docker_dir(root).join(name)
}
