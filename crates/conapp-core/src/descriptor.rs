//! Command groups, commands, and parameter declarations.
//!
//! Descriptors are built once by [`RegistryBuilder`](crate::RegistryBuilder)
//! and are immutable afterwards, except for the per-command classification
//! cache that [`classify`](crate::classify::classify) fills on first use.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::classify::{self, ClassifiedParameters};
use crate::handler::CommandHandler;

/// Declared type of a parameter. Selects the converter used during binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    /// A type with a converter registered through
    /// [`Converters::register_custom`](crate::Converters::register_custom).
    Custom(String),
}

impl ValueType {
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// How a parameter receives its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Supplied as `key[:value]` between the command name and the first argument.
    Option,
    /// Supplied as `--key[:value]`.
    Argument,
    /// Neither option nor argument. Must be optional.
    Unmarked,
    /// Bound to the owning command group; never read from input.
    Context,
}

/// A parameter as written by the command author.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    pub name: String,
    pub description: String,
    pub value_type: ValueType,
    pub kind: ParameterKind,
    /// Raw default, converted with the parameter's converter when used.
    pub default: Option<String>,
    pub optional: bool,
}

impl ParameterDeclaration {
    fn new(name: impl Into<String>, value_type: ValueType, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value_type,
            kind,
            default: None,
            optional: false,
        }
    }

    pub fn option(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, value_type, ParameterKind::Option)
    }

    pub fn argument(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, value_type, ParameterKind::Argument)
    }

    pub fn unmarked(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, value_type, ParameterKind::Unmarked)
    }

    /// A parameter that receives the command's own group. The value type is
    /// not consulted for context parameters.
    pub fn context(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String, ParameterKind::Context)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Give the parameter a default. Implies [`optional`](Self::optional).
    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self.optional = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A classified parameter with its position in the declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub description: String,
    pub value_type: ValueType,
    pub kind: ParameterKind,
    pub default: Option<String>,
    pub is_optional: bool,
    pub position: usize,
}

impl ParameterDescriptor {
    /// Parameter names are matched ASCII case-insensitively.
    pub fn matches(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key)
    }
}

/// Identity handle of a command, unique within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub(crate) usize);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single invokable command.
pub struct CommandDescriptor {
    pub(crate) id: CommandId,
    pub(crate) name: String,
    pub(crate) group: String,
    pub(crate) description: String,
    pub(crate) example_usage: String,
    pub(crate) declared: Vec<ParameterDeclaration>,
    pub(crate) handler: Arc<dyn CommandHandler>,
    pub(crate) classified: OnceLock<ClassifiedParameters>,
}

impl CommandDescriptor {
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Command name within its group. Empty for the group's default command.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning group.
    pub fn group_name(&self) -> &str {
        &self.group
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn example_usage(&self) -> &str {
        &self.example_usage
    }

    /// `"{group} {command}"`, trimmed. This is the name typed by the user.
    pub fn display_name(&self) -> String {
        combined_name(&self.group, &self.name)
    }

    pub fn declared_parameters(&self) -> &[ParameterDeclaration] {
        &self.declared
    }

    pub fn handler(&self) -> &dyn CommandHandler {
        self.handler.as_ref()
    }

    /// Option parameters in declaration order.
    pub fn options(&self) -> &[ParameterDescriptor] {
        &classify::classify(self).options
    }

    /// Argument parameters in declaration order.
    pub fn arguments(&self) -> &[ParameterDescriptor] {
        &classify::classify(self).arguments
    }

    /// Whether the classification cache has been filled.
    pub fn is_classified(&self) -> bool {
        self.classified.get().is_some()
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("group", &self.group)
            .field("declared", &self.declared.len())
            .finish_non_exhaustive()
    }
}

/// A named collection of related commands.
#[derive(Debug)]
pub struct CommandGroupDescriptor {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) commands: Vec<CommandDescriptor>,
}

impl CommandGroupDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    /// Whether the group name is an ASCII case-insensitive prefix of
    /// `command_name`.
    pub fn is_prefix_of(&self, command_name: &str) -> bool {
        command_name
            .get(..self.name.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&self.name))
    }

    /// Distinct combined command names, in registration order.
    pub fn available_commands(&self) -> Vec<String> {
        let mut seen = HashSet::with_capacity(self.commands.len());
        self.commands
            .iter()
            .map(CommandDescriptor::display_name)
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

/// A command together with the group that owns it.
#[derive(Debug, Clone, Copy)]
pub struct CommandRef<'a> {
    pub group: &'a CommandGroupDescriptor,
    pub command: &'a CommandDescriptor,
}

pub(crate) fn combined_name(group: &str, command: &str) -> String {
    format!("{group} {command}").trim().to_string()
}
