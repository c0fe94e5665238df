//! Command registry and the builder that declares it.
//!
//! Groups, commands and parameter declarations are declared up front with
//! [`RegistryBuilder`]. [`RegistryBuilder::build`] validates the declarations,
//! assigns command ids, and adds the built-in help commands.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use conapp_types::config::ResolverConfig;
use conapp_types::error::{ConappError, Result};

use crate::descriptor::{
    CommandDescriptor, CommandGroupDescriptor, CommandId, CommandRef, ParameterDeclaration,
};
use crate::handler::{CommandHandler, CommandOutput, Invocation};
use crate::help;

/// The immutable set of command groups.
#[derive(Debug, Default)]
pub struct Registry {
    groups: Vec<CommandGroupDescriptor>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry with no groups at all, not even help.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[CommandGroupDescriptor] {
        &self.groups
    }

    /// Look up a group by name (ASCII case-insensitive).
    pub fn group(&self, name: &str) -> Option<&CommandGroupDescriptor> {
        self.groups.iter().find(|g| g.name.eq_ignore_ascii_case(name))
    }

    /// Every distinct combined command name, in registration order. This is
    /// the set the input parser matches the command words against.
    pub fn available_commands(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .flat_map(CommandGroupDescriptor::available_commands)
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    pub fn command(&self, id: CommandId) -> Option<CommandRef<'_>> {
        self.groups.iter().find_map(|group| {
            group
                .commands
                .iter()
                .find(|c| c.id == id)
                .map(|command| CommandRef { group, command })
        })
    }

    /// Number of commands across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.commands.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Declares a single command.
pub struct CommandBuilder {
    name: String,
    description: String,
    example_usage: String,
    parameters: Vec<ParameterDeclaration>,
    handler: Arc<dyn CommandHandler>,
}

impl CommandBuilder {
    /// A command backed by a closure.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        Self::from_handler(name, description, handler)
    }

    /// The group's default command: invoked when only the group name is typed.
    pub fn default_command<F>(description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        Self::from_handler("", description, handler)
    }

    /// A command backed by any [`CommandHandler`].
    pub fn from_handler(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            example_usage: String::new(),
            parameters: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn example(mut self, usage: impl Into<String>) -> Self {
        self.example_usage = usage.into();
        self
    }

    /// Append a parameter. Declaration order is invocation order.
    pub fn parameter(mut self, declaration: ParameterDeclaration) -> Self {
        self.parameters.push(declaration);
        self
    }

    fn validate(&self, group: &str) -> Result<()> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.parameters.len());
        for p in &self.parameters {
            if p.name.trim().is_empty() {
                return Err(ConappError::Registry(format!(
                    "command `{group} {}` declares a parameter with an empty name",
                    self.name
                )));
            }
            if seen.iter().any(|s| s.eq_ignore_ascii_case(&p.name)) {
                return Err(ConappError::Registry(format!(
                    "command `{group} {}` declares parameter `{}` twice",
                    self.name, p.name
                )));
            }
            seen.push(&p.name);
        }
        Ok(())
    }

    fn build(self, id: CommandId, group: &str) -> CommandDescriptor {
        CommandDescriptor {
            id,
            name: self.name.trim().to_string(),
            group: group.to_string(),
            description: self.description,
            example_usage: self.example_usage,
            declared: self.parameters,
            handler: self.handler,
            classified: OnceLock::new(),
        }
    }
}

/// Declares a command group.
pub struct GroupBuilder {
    name: String,
    description: String,
    commands: Vec<CommandBuilder>,
}

impl GroupBuilder {
    pub fn command(&mut self, command: CommandBuilder) -> &mut Self {
        self.commands.push(command);
        self
    }
}

/// Builds a [`Registry`].
pub struct RegistryBuilder {
    groups: Vec<GroupBuilder>,
    app_name: String,
    group_help: bool,
    root_help: bool,
}

impl RegistryBuilder {
    /// A builder using the default [`ResolverConfig`].
    pub fn new() -> Self {
        Self::with_config(&ResolverConfig::default())
    }

    pub fn with_config(config: &ResolverConfig) -> Self {
        Self {
            groups: Vec::new(),
            app_name: config.app_name.clone(),
            group_help: config.group_help,
            root_help: config.root_help,
        }
    }

    /// Start declaring a group.
    pub fn group(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut GroupBuilder {
        let index = self.groups.len();
        self.groups.push(GroupBuilder {
            name: name.into(),
            description: description.into(),
            commands: Vec::new(),
        });
        &mut self.groups[index]
    }

    pub fn build(self) -> Result<Registry> {
        self.validate()?;

        let mut next_id = 0;
        let mut id = || {
            let id = CommandId(next_id);
            next_id += 1;
            id
        };

        let mut groups = Vec::with_capacity(self.groups.len() + 1);
        for group in self.groups {
            let name = group.name.trim().to_string();
            let mut commands: Vec<CommandDescriptor> = group
                .commands
                .into_iter()
                .map(|c| c.build(id(), &name))
                .collect();
            if self.group_help && !name.eq_ignore_ascii_case(help::HELP_GROUP) {
                commands.push(help::group_help_command(&self.app_name).build(id(), &name));
            }
            groups.push(CommandGroupDescriptor {
                name,
                description: group.description,
                commands,
            });
        }
        if self.root_help {
            let root = help::root_help_command(&self.app_name).build(id(), help::HELP_GROUP);
            groups.push(CommandGroupDescriptor {
                name: help::HELP_GROUP.to_string(),
                description: "List all command groups".to_string(),
                commands: vec![root],
            });
        }

        let registry = Registry { groups };
        log::debug!(
            "registry built: {} groups, {} commands",
            registry.groups.len(),
            registry.len()
        );
        Ok(registry)
    }

    fn validate(&self) -> Result<()> {
        let mut seen: HashSet<String> = HashSet::new();
        for group in &self.groups {
            let name = group.name.trim();
            if name.is_empty() {
                return Err(ConappError::Registry("group name must not be empty".into()));
            }
            if self.root_help && name.eq_ignore_ascii_case(help::HELP_GROUP) {
                return Err(ConappError::Registry(format!(
                    "group name `{name}` is reserved for the built-in help"
                )));
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ConappError::Registry(format!("group `{name}` declared twice")));
            }
            for command in &group.commands {
                command.validate(name)?;
            }
        }
        Ok(())
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ParameterKind, ValueType};

    fn noop(name: &str) -> CommandBuilder {
        CommandBuilder::new(name, "", |_| Ok(CommandOutput::None))
    }

    fn bare_builder() -> RegistryBuilder {
        RegistryBuilder::with_config(&ResolverConfig {
            group_help: false,
            root_help: false,
            ..ResolverConfig::default()
        })
    }

    #[test]
    fn empty_registry_has_no_commands() {
        let registry = Registry::empty();
        assert!(registry.is_empty());
        assert!(registry.available_commands().is_empty());
    }

    #[test]
    fn default_build_adds_root_help() {
        let registry = RegistryBuilder::new().build().unwrap();
        assert_eq!(registry.groups().len(), 1);
        assert_eq!(registry.available_commands(), ["help"]);
    }

    #[test]
    fn groups_get_help_commands() {
        let mut builder = RegistryBuilder::new();
        builder.group("math", "Arithmetic").command(noop("add")).command(noop("subtract"));
        let registry = builder.build().unwrap();

        assert_eq!(
            registry.available_commands(),
            ["math add", "math subtract", "math help", "help"]
        );
        let help = &registry.group("MATH").unwrap().commands()[2];
        assert_eq!(help.name(), "help");
        assert_eq!(help.declared_parameters()[0].kind, ParameterKind::Context);
    }

    #[test]
    fn help_can_be_disabled() {
        let mut builder = bare_builder();
        builder.group("math", "").command(noop("add"));
        let registry = builder.build().unwrap();
        assert_eq!(registry.available_commands(), ["math add"]);
    }

    #[test]
    fn ids_are_unique_and_resolvable() {
        let mut builder = RegistryBuilder::new();
        builder.group("math", "").command(noop("add")).command(noop("add"));
        builder.group("weather", "").command(noop("today"));
        let registry = builder.build().unwrap();

        let ids: HashSet<CommandId> = registry
            .groups()
            .iter()
            .flat_map(|g| g.commands().iter().map(|c| c.id()))
            .collect();
        assert_eq!(ids.len(), registry.len());

        let second = registry.groups()[0].commands()[1].id();
        let found = registry.command(second).unwrap();
        assert_eq!(found.group.name(), "math");
        assert_eq!(found.command.id(), second);
    }

    #[test]
    fn overloads_share_one_available_name() {
        let mut builder = bare_builder();
        builder.group("math", "").command(noop("add")).command(noop("add"));
        let registry = builder.build().unwrap();
        assert_eq!(registry.available_commands(), ["math add"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn same_name_from_two_groups_listed_once() {
        let mut builder = bare_builder();
        builder.group("list", "").command(noop("packages")).command(noop("files"));
        builder
            .group("list packages", "")
            .command(CommandBuilder::default_command("", |_| Ok(CommandOutput::None)));
        let registry = builder.build().unwrap();
        assert_eq!(registry.available_commands(), ["list packages", "list files"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn default_command_uses_group_name() {
        let mut builder = bare_builder();
        builder
            .group("version", "")
            .command(CommandBuilder::default_command("Print version", |_| {
                Ok(CommandOutput::Text("1.0".into()))
            }));
        let registry = builder.build().unwrap();
        assert_eq!(registry.available_commands(), ["version"]);
    }

    #[test]
    fn rejects_empty_group_name() {
        let mut builder = RegistryBuilder::new();
        builder.group("  ", "");
        assert!(matches!(builder.build(), Err(ConappError::Registry(_))));
    }

    #[test]
    fn rejects_duplicate_group_name() {
        let mut builder = RegistryBuilder::new();
        builder.group("math", "");
        builder.group("Math", "");
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn rejects_help_group_when_root_help_is_on() {
        let mut builder = RegistryBuilder::new();
        builder.group("help", "");
        assert!(matches!(builder.build(), Err(ConappError::Registry(_))));

        let mut builder = bare_builder();
        builder.group("help", "").command(noop(""));
        assert!(builder.build().is_ok());
    }

    #[test]
    fn rejects_duplicate_parameter_names() {
        let mut builder = RegistryBuilder::new();
        builder.group("math", "").command(
            noop("add")
                .parameter(ParameterDeclaration::option("value", ValueType::Integer))
                .parameter(ParameterDeclaration::argument("VALUE", ValueType::Integer)),
        );
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn command_knows_its_group() {
        let mut builder = bare_builder();
        builder.group("list", "").command(noop("packages").example("list packages --filter:time"));
        let registry = builder.build().unwrap();
        let command = &registry.groups()[0].commands()[0];
        assert_eq!(command.group_name(), "list");
        assert_eq!(command.display_name(), "list packages");
        assert_eq!(command.example_usage(), "list packages --filter:time");
    }
}
