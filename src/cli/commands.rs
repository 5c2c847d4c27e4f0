//! Command dispatch: load inputs, drive a selector, print the outcome

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::application::{
    load_forest, parse_value, RecordingListener, SelectorEvent, TreeSelector,
};
use crate::cli::args::{Cli, Commands, ConfigCommands, TreeArgs};
use crate::cli::output;
use crate::cli::render::ToTermTree;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, SelectorConfig, Settings};
use crate::domain::{NodeId, Outcome};

type Selector = TreeSelector<RecordingListener>;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    match command {
        Commands::Config { command } => return execute_config(cli, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let settings = Settings::load(cli.config.as_deref())?;
    match command {
        Commands::Show { tree } => {
            let selector = open(&settings, tree)?;
            finish(selector, Outcome::Applied)
        }
        Commands::Check { tree, node, uncheck } => {
            let mut selector = open(&settings, tree)?;
            let id = resolve(&selector, node)?;
            let outcome = selector.check(id, !uncheck);
            finish(selector, outcome)
        }
        Commands::Select { tree, node } => {
            let mut selector = open(&settings, tree)?;
            let id = resolve(&selector, node)?;
            let outcome = selector.select(id);
            finish(selector, outcome)
        }
        Commands::Activate { tree, node } => {
            let mut selector = open(&settings, tree)?;
            let id = resolve(&selector, node)?;
            let outcome = selector.activate(id);
            finish(selector, outcome)
        }
        Commands::Fold { tree, node } => {
            let mut selector = open(&settings, tree)?;
            let id = resolve(&selector, node)?;
            let outcome = selector.toggle_fold(id);
            finish(selector, outcome)
        }
        Commands::Clear { tree } => {
            let mut selector = open(&settings, tree)?;
            let outcome = selector.clear();
            finish(selector, outcome)
        }
        Commands::Add { tree, parent, label } => {
            let mut selector = open_inline(&settings, tree)?;
            let parent = parent
                .as_deref()
                .map(|value| resolve(&selector, value))
                .transpose()?;
            let outcome = inline_commit(&mut selector, label, |s| s.request_add(parent));
            finish(selector, outcome)
        }
        Commands::Edit { tree, node, label } => {
            let mut selector = open_inline(&settings, tree)?;
            let id = resolve(&selector, node)?;
            let outcome = inline_commit(&mut selector, label, |s| s.request_edit(id));
            finish(selector, outcome)
        }
        Commands::Remove { tree, node } => {
            let mut selector = open(&settings, tree)?;
            let id = resolve(&selector, node)?;
            let outcome = selector.request_remove(id);
            finish(selector, outcome)
        }
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let status = if path.exists() { "exists" } else { "not found" };
                    output::action("global", &format!("{} ({status})", path.display()));
                }
                None => output::warning("no home directory, global config disabled"),
            }
            if let Some(path) = &cli.config {
                output::action("local", &path.display());
            }
        }
    }
    Ok(())
}

/// Build a selector for a tree command: config overlaid with the mode switches.
#[instrument(level = "debug", skip(settings))]
fn open(settings: &Settings, args: &TreeArgs) -> CliResult<Selector> {
    let config = overlay(&settings.selector, args);
    let forest = load_forest(&args.forest)?;
    let value = args.value.as_deref().map(parse_value).unwrap_or(Value::Null);
    debug!(%value, "opening selector");
    Ok(TreeSelector::new(config, forest, &value, RecordingListener::new())?)
}

/// Inline add/edit needs the in-core edit session.
fn open_inline(settings: &Settings, args: &TreeArgs) -> CliResult<Selector> {
    let mut settings = settings.clone();
    settings.selector.builtin_cud = true;
    open(&settings, args)
}

fn overlay(base: &SelectorConfig, args: &TreeArgs) -> SelectorConfig {
    let mut config = base.clone();
    config.multiple |= args.multiple;
    config.cascade |= args.cascade;
    config.with_children |= args.with_children;
    config.only_children |= args.only_children;
    config
}

fn resolve(selector: &Selector, value: &str) -> CliResult<NodeId> {
    selector
        .find_by_value(value)
        .ok_or_else(|| CliError::UnknownValue(value.to_string()))
}

/// Open a session, type the label and confirm it.
fn inline_commit<F>(selector: &mut Selector, label: &str, begin: F) -> Outcome
where
    F: FnOnce(&mut Selector) -> Outcome,
{
    let outcome = begin(selector);
    if !outcome.is_applied() {
        return outcome;
    }
    let outcome = selector.input_changed(label);
    if !outcome.is_applied() {
        return outcome;
    }
    selector.confirm()
}

/// Print the tree and every recorded callback; a rejection becomes the exit status.
fn finish(mut selector: Selector, outcome: Outcome) -> CliResult<()> {
    output::info(&selector.view().to_term_tree());

    let events = selector.listener_mut().drain();
    for event in &events {
        print_event(event);
    }
    if events.is_empty() {
        output::detail(&format!("value: {}", selector.value()));
    }

    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::Rejected(rejection) => Err(CliError::Rejected(rejection)),
    }
}

fn print_event(event: &SelectorEvent) {
    match event {
        SelectorEvent::Change(value) => output::action("change", value),
        SelectorEvent::Add(request) => {
            let path = request
                .path
                .as_ref()
                .map(|p| p.iter().join("."))
                .unwrap_or_else(|| "-".to_string());
            let payload = json!({"draft": request.draft, "skip_form": request.skip_form});
            output::action("add", &format!("at {path} {payload}"));
        }
        SelectorEvent::Edit(request) => {
            output::action("edit", &request.updated);
            output::detail(&format!("was {}", request.original));
        }
        SelectorEvent::Delete(node) => output::action("delete", node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn given_mode_switches_when_overlaying_then_only_turns_options_on() {
        let cli = Cli::parse_from(["treeselect", "show", "-f", "forest.json", "-m", "--cascade"]);
        let Some(Commands::Show { tree }) = cli.command else {
            panic!("expected show");
        };
        let base = SelectorConfig {
            only_children: true,
            ..SelectorConfig::default()
        };

        let config = overlay(&base, &tree);

        assert!(config.multiple);
        assert!(config.cascade);
        assert!(config.only_children);
        assert!(!config.with_children);
    }
}
