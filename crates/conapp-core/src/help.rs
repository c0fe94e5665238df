//! Built-in help commands.
//!
//! `help` lists the command groups. `{group} help` is added to every other
//! group and describes that group's commands.

use conapp_types::error::ConappError;

use crate::descriptor::{CommandGroupDescriptor, ParameterDeclaration, ParameterDescriptor};
use crate::handler::{CommandOutput, Invocation};
use crate::registry::CommandBuilder;

/// Name of the root help group and of every per-group help command.
pub const HELP_GROUP: &str = "help";

/// Name of the context parameter the group help command declares.
const GROUP_PARAMETER: &str = "group";

/// Gap between the key column and the description column.
const COLUMN_GAP: usize = 5;

pub(crate) fn root_help_command(app_name: &str) -> CommandBuilder {
    let app_name = app_name.to_string();
    CommandBuilder::default_command("List all command groups", move |call| {
        Ok(CommandOutput::Text(root_help(call, &app_name)))
    })
}

pub(crate) fn group_help_command(app_name: &str) -> CommandBuilder {
    let app_name = app_name.to_string();
    CommandBuilder::new(HELP_GROUP, "Describe the commands in this group", move |call| {
        let group = call.context_group(GROUP_PARAMETER).ok_or_else(|| {
            ConappError::Command(format!("`{GROUP_PARAMETER}` was not bound to a command group"))
        })?;
        Ok(CommandOutput::Text(group_help(call, group, &app_name)))
    })
    .parameter(ParameterDeclaration::context(GROUP_PARAMETER).describe("The group to describe"))
}

fn root_help(call: &Invocation<'_>, app_name: &str) -> String {
    let rows: Vec<(String, &str)> = call
        .registry()
        .groups()
        .iter()
        .map(|g| (g.name().to_string(), g.description()))
        .collect();

    let mut out = String::from("Available commands:\n");
    write_columns(&mut out, &rows, 0);
    out.push_str(&format!(
        "\nRun \"{app_name} [command] {HELP_GROUP}\" to get help for a specific command."
    ));
    out
}

fn group_help(call: &Invocation<'_>, group: &CommandGroupDescriptor, app_name: &str) -> String {
    let this = call.command().id();
    let mut out = format!("Command group: {}\n", group.name());
    out.push_str(&format!(
        "Syntax: {app_name} {} [command] [option:value] [[--]argument:value]\n",
        group.name()
    ));
    out.push_str("\nAvailable commands:\n");

    for command in group.commands().iter().filter(|c| c.id() != this) {
        out.push_str(&format!("{} - {}\n", command.name(), command.description()));
        write_parameters(&mut out, "Options", command.options(), "");
        write_parameters(&mut out, "Arguments", command.arguments(), "--");
        if !command.example_usage().trim().is_empty() {
            out.push_str(&format!("  Example usage:\n    {}\n", command.example_usage()));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn write_parameters(
    out: &mut String,
    title: &str,
    parameters: &[ParameterDescriptor],
    prefix: &str,
) {
    if parameters.is_empty() {
        return;
    }
    out.push_str(&format!("  {title}:\n"));
    let rows: Vec<(String, &str)> = parameters
        .iter()
        .map(|p| {
            let mut key = format!("{prefix}{} ({}", p.name, p.value_type);
            match (&p.default, p.is_optional) {
                (Some(default), _) => key.push_str(&format!(", default {default}")),
                (None, true) => key.push_str(", optional"),
                (None, false) => {},
            }
            key.push(')');
            (key, p.description.as_str())
        })
        .collect();
    write_columns(out, &rows, 4);
}

/// Two-column listing with the description column aligned.
fn write_columns(out: &mut String, rows: &[(String, &str)], indent: usize) {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + COLUMN_GAP;
    for (key, description) in rows {
        let line = format!("{:indent$}{key:<width$}{description}", "");
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Binder;
    use crate::convert::Converters;
    use crate::descriptor::{CommandRef, ValueType};
    use crate::input::KeyValues;
    use crate::registry::{Registry, RegistryBuilder};

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder
            .group("math", "Simple arithmetic")
            .command(
                CommandBuilder::new("add", "Adds two numbers", |_| Ok(CommandOutput::None))
                    .example("math add value1:1 value2:2")
                    .parameter(
                        ParameterDeclaration::option("value1", ValueType::Integer)
                            .describe("First operand"),
                    )
                    .parameter(
                        ParameterDeclaration::option("value2", ValueType::Integer)
                            .describe("Second operand"),
                    )
                    .parameter(
                        ParameterDeclaration::argument("pretty", ValueType::Boolean)
                            .optional()
                            .describe("Pretty print"),
                    ),
            );
        builder.group("weather", "Weather reports");
        builder.build().unwrap()
    }

    fn run(registry: &Registry, group: &str, command: &str) -> String {
        let converters = Converters::new();
        let group = registry.group(group).unwrap();
        let command = group.commands().iter().find(|c| c.name() == command).unwrap();
        let outcome = Binder::new(&converters).bind(command, &KeyValues::new(), &KeyValues::new());
        let call = Invocation::new(registry, CommandRef { group, command }, &outcome, &converters);
        match command.handler().invoke(&call).unwrap() {
            CommandOutput::Text(text) => text,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn root_help_lists_groups() {
        let registry = registry();
        let text = run(&registry, "help", "");
        assert!(text.starts_with("Available commands:"));
        assert!(text.contains("math        Simple arithmetic"));
        assert!(text.contains("weather     Weather reports"));
        assert!(text.contains("help        List all command groups"));
        assert!(
            text.ends_with("Run \"conapp [command] help\" to get help for a specific command.")
        );
    }

    #[test]
    fn group_help_describes_commands() {
        let registry = registry();
        let text = run(&registry, "math", "help");
        assert!(text.starts_with("Command group: math"));
        assert!(text.contains("Syntax: conapp math [command] [option:value] [[--]argument:value]"));
        assert!(text.contains("add - Adds two numbers"));
        assert!(text.contains("    value1 (integer)"));
        assert!(text.contains("First operand"));
        assert!(text.contains("    --pretty (boolean, optional)"));
        assert!(text.contains("  Example usage:\n    math add value1:1 value2:2"));
    }

    #[test]
    fn group_help_omits_itself() {
        let registry = registry();
        let text = run(&registry, "math", "help");
        assert!(!text.contains("help - "));
    }

    #[test]
    fn group_help_uses_configured_app_name() {
        let mut builder = RegistryBuilder::with_config(&conapp_types::config::ResolverConfig {
            app_name: "pkg".into(),
            ..Default::default()
        });
        builder.group("list", "");
        let registry = builder.build().unwrap();
        let text = run(&registry, "list", "help");
        assert!(text.contains("Syntax: pkg list [command]"));
    }

    #[test]
    fn columns_align_on_longest_key() {
        let mut out = String::new();
        write_columns(&mut out, &[("a".into(), "one"), ("abc".into(), "three")], 2);
        assert_eq!(out, "  a       one\n  abc     three\n");
    }
}
