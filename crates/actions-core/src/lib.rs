pub mod action;
pub mod builtin;
pub mod callback_task;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod image;
pub mod io;
pub mod loader;
pub mod manifest;
pub mod parameters;
pub mod paths;
pub mod register;
pub mod registry;
pub mod slugid;

pub use action::{Action, BuildContext, TagSet};
pub use dispatch::{
    trigger_action_callback, CallbackInvocation, Submission, SubmissionMode, TestingSwitch,
};
pub use error::{ActionsError, Result};
pub use host::ActionHost;
pub use loader::{ActionSource, Loader};
pub use manifest::{render_actions_json, Manifest};
pub use parameters::Parameters;
pub use register::{register_callback_action, register_task_action};
pub use registry::{ActionCallback, CallbackResult, Registry};
