use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionsError {
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("symbol '{0}' must be between 1 and 25 characters")]
    InvalidSymbol(String),

    #[error("registration for action '{0}' was already applied")]
    AlreadyRegistered(String),

    #[error("action name '{0}' is not unique")]
    DuplicateAction(String),

    #[error("callback name '{0}' is not unique")]
    DuplicateCallback(String),

    #[error("callback must be a named function, got {0}")]
    NotAFunction(String),

    #[error("malformed action source '{origin}': {reason}")]
    MalformedSource { origin: String, reason: String },

    #[error("task for action '{action}' is not JSON compatible")]
    TaskNotJson {
        action: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized head_repository: {0}")]
    UnrecognizedRepository(String),

    #[error("missing run parameter: {0}")]
    MissingParameter(String),

    #[error("invalid run parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("unknown callback: {callback}. Known callbacks: {}", .known.join(", "))]
    UnknownCallback { callback: String, known: Vec<String> },

    #[error("callback '{callback}' failed")]
    Callback {
        callback: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("image '{name}' could not be resolved: {reason}")]
    Image { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ActionsError>;
