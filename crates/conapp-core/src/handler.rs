//! Command handlers and the view of a bound invocation they receive.

use conapp_types::error::Result;

use crate::binder::{Binding, BindingOutcome};
use crate::classify;
use crate::convert::{Converters, Value};
use crate::descriptor::{CommandDescriptor, CommandGroupDescriptor, CommandRef};
use crate::registry::Registry;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Plain text lines.
    Text(String),
    /// Tabular data (header row + data rows).
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Command produced no visible output.
    None,
}

/// The code run when a command is invoked.
pub trait CommandHandler: Send + Sync {
    fn invoke(&self, call: &Invocation<'_>) -> Result<CommandOutput>;
}

impl<F> CommandHandler for F
where
    F: Fn(&Invocation<'_>) -> Result<CommandOutput> + Send + Sync,
{
    fn invoke(&self, call: &Invocation<'_>) -> Result<CommandOutput> {
        self(call)
    }
}

/// One positional value handed to a handler, in declaration order.
#[derive(Debug, Clone)]
pub enum BoundArg<'a> {
    Value(Value),
    /// Optional parameter that was not supplied and has no usable default.
    Missing,
    /// A context parameter: the command's own group.
    Group(&'a CommandGroupDescriptor),
}

/// A runnable binding of one command, passed to its handler.
pub struct Invocation<'a> {
    registry: &'a Registry,
    target: CommandRef<'a>,
    outcome: &'a BindingOutcome,
    converters: &'a Converters,
}

impl<'a> Invocation<'a> {
    pub fn new(
        registry: &'a Registry,
        target: CommandRef<'a>,
        outcome: &'a BindingOutcome,
        converters: &'a Converters,
    ) -> Self {
        Self {
            registry,
            target,
            outcome,
            converters,
        }
    }

    /// The registry the command was resolved from.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn command(&self) -> &'a CommandDescriptor {
        self.target.command
    }

    /// Value of a parameter by name. Unsupplied optional parameters fall
    /// back to their declared default.
    pub fn value(&self, name: &str) -> Option<Value> {
        let slot = self.outcome.slot(name)?;
        match &slot.binding {
            Binding::Value(value) => Some(value.clone()),
            Binding::Default => self.default_value(name),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Option<String> {
        match self.value(name)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.value(name)?.as_i64()
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.value(name)?.as_f64()
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.value(name)?.as_bool()
    }

    /// Whether the user supplied a value for the parameter.
    pub fn is_supplied(&self, name: &str) -> bool {
        self.outcome
            .slot(name)
            .is_some_and(|slot| matches!(slot.binding, Binding::Value(_)))
    }

    /// The owning group, if `name` is a context parameter.
    pub fn context_group(&self, name: &str) -> Option<&'a CommandGroupDescriptor> {
        let slot = self.outcome.slot(name)?;
        matches!(slot.binding, Binding::Context).then_some(self.target.group)
    }

    /// All parameters as positional values, in declaration order.
    pub fn positional(&self) -> Vec<BoundArg<'a>> {
        self.outcome
            .slots
            .iter()
            .map(|slot| match &slot.binding {
                Binding::Value(value) => BoundArg::Value(value.clone()),
                Binding::Context => BoundArg::Group(self.target.group),
                Binding::Default => self
                    .default_value(&slot.name)
                    .map_or(BoundArg::Missing, BoundArg::Value),
                _ => BoundArg::Missing,
            })
            .collect()
    }

    fn default_value(&self, name: &str) -> Option<Value> {
        let parameter = classify::classify(self.target.command).get(name)?;
        let raw = parameter.default.as_deref()?;
        match self.converters.convert(&parameter.value_type, raw) {
            Ok(value) => Some(value),
            Err(reason) => {
                log::warn!(
                    "default `{raw}` of `{}` in `{}` is not a valid {}: {reason}",
                    parameter.name,
                    self.target.command.display_name(),
                    parameter.value_type,
                );
                None
            },
        }
    }
}
