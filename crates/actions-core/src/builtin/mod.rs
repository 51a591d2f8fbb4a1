//! Actions shipped with the crate.

mod hello;

use crate::loader::ActionSource;

pub use hello::hello_world_action;

pub fn sources() -> Vec<ActionSource> {
    vec![
        ActionSource::Plugin {
            name: "hello",
            register: hello::register,
        },
        ActionSource::Declarative {
            name: "retrigger_decision.yml",
            document: include_str!("retrigger_decision.yml"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Loader;

    #[test]
    fn builtin_sources_load() {
        let loader = Loader::new(sources());
        let registry = loader.load().unwrap();
        assert_eq!(registry.callback_names(), vec!["hello_world_action"]);
        let names: Vec<_> = registry
            .sorted_actions()
            .into_iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["retrigger-decision", "hello"]);
        assert_eq!(
            registry.action("retrigger-decision").unwrap().context[0]["kind"],
            "decision-task"
        );
    }
}
