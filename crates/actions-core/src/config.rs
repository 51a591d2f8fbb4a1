use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// CallbackTaskConfig
// ---------------------------------------------------------------------------

/// Defaults baked into every synthesized action-callback task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackTaskConfig {
    /// Prefix for worker types, scheduler ids and index routes.
    #[serde(default = "default_trust_domain")]
    pub trust_domain: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_provisioner_id")]
    pub provisioner_id: String,
    #[serde(default = "default_base_repository")]
    pub base_repository: String,
    /// JSON-e `$fromNow` offset for the task deadline.
    #[serde(default = "default_deadline")]
    pub deadline: String,
    /// JSON-e `$fromNow` offset for task and artifact expiry.
    #[serde(default = "default_expires")]
    pub expires: String,
    /// Seconds.
    #[serde(default = "default_max_run_time")]
    pub max_run_time: u32,
    /// Symbolic image name handed to the image resolver.
    #[serde(default = "default_image")]
    pub image: String,
    /// Shell line run inside the checkout to re-enter the action entry point.
    #[serde(default = "default_callback_command")]
    pub callback_command: String,
}

fn default_trust_domain() -> String {
    "gecko".to_string()
}

fn default_owner() -> String {
    "mozilla-taskcluster-maintenance@mozilla.com".to_string()
}

fn default_provisioner_id() -> String {
    "aws-provisioner-v1".to_string()
}

fn default_base_repository() -> String {
    "https://hg.mozilla.org/mozilla-unified".to_string()
}

fn default_deadline() -> String {
    "12 hours".to_string()
}

fn default_expires() -> String {
    "1 year".to_string()
}

fn default_max_run_time() -> u32 {
    1800
}

fn default_image() -> String {
    "decision".to_string()
}

fn default_callback_command() -> String {
    "./mach --log-no-times taskgraph action-callback".to_string()
}

impl Default for CallbackTaskConfig {
    fn default() -> Self {
        Self {
            trust_domain: default_trust_domain(),
            owner: default_owner(),
            provisioner_id: default_provisioner_id(),
            base_repository: default_base_repository(),
            deadline: default_deadline(),
            expires: default_expires(),
            max_run_time: default_max_run_time(),
            image: default_image(),
            callback_command: default_callback_command(),
        }
    }
}

impl CallbackTaskConfig {
    /// Load `taskcluster/actions.yml` under `root`. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: CallbackTaskConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let required = [
            ("trust_domain", &self.trust_domain),
            ("owner", &self.owner),
            ("provisioner_id", &self.provisioner_id),
            ("image", &self.image),
            ("callback_command", &self.callback_command),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{field} must not be empty"),
                });
            }
        }

        if !self.owner.contains('@') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("owner '{}' does not look like an email address", self.owner),
            });
        }

        if !self.base_repository.starts_with("https://") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "base_repository '{}' is not an https URL",
                    self.base_repository
                ),
            });
        }

        if self.max_run_time == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "max_run_time must be greater than zero".to_string(),
            });
        } else if self.max_run_time > 86_400 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "max_run_time={} (more than a day is unusual for a callback task)",
                    self.max_run_time
                ),
            });
        }

        if !self.callback_command.contains("action-callback") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "callback_command does not invoke the action-callback entry point"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
