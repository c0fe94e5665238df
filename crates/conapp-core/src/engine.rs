//! Resolution pipeline: parse, match, bind, invoke.

use std::collections::HashSet;

use conapp_types::config::ResolverConfig;
use conapp_types::error::{ConappError, Result};

use crate::binder::{Binder, BindingOutcome};
use crate::convert::Converters;
use crate::handler::{CommandOutput, Invocation};
use crate::input::{self, ParsedInput};
use crate::matcher::{self, CommandMatch};
use crate::registry::Registry;

/// A request resolved to a command, with its binding. Nothing has been
/// invoked yet.
#[derive(Debug)]
pub struct Resolution<'a> {
    pub input: ParsedInput,
    pub matched: CommandMatch<'a>,
    pub outcome: BindingOutcome,
}

impl Resolution<'_> {
    pub fn is_runnable(&self) -> bool {
        self.outcome.is_runnable()
    }
}

/// Resolves and runs argument vectors against one registry.
#[derive(Debug)]
pub struct Engine {
    registry: Registry,
    converters: Converters,
    available: HashSet<String>,
    bare_flag_is_true: bool,
}

impl Engine {
    pub fn new(registry: Registry, converters: Converters, config: &ResolverConfig) -> Self {
        let available = registry.available_commands().into_iter().collect();
        Self {
            registry,
            converters,
            available,
            bare_flag_is_true: config.bare_flag_is_true,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn converters(&self) -> &Converters {
        &self.converters
    }

    /// Tokenize without matching.
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> Result<ParsedInput> {
        input::parse(args, &self.available)
    }

    /// Parse, match and bind `args`. Fails only when parsing fails or no
    /// command fits; a binding with problems is returned for inspection.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<Resolution<'_>> {
        let input = self.parse(args)?;
        log::debug!(
            "parsed `{}`: {} options, {} arguments",
            input.command,
            input.options.len(),
            input.arguments.len()
        );

        let matched = matcher::find_match(&self.registry, &input)
            .ok_or_else(|| ConappError::NoMatchingCommand(input.command.clone()))?;

        let outcome = Binder::new(&self.converters)
            .bare_flag_is_true(self.bare_flag_is_true)
            .bind(matched.command, &input.options, &input.arguments);

        Ok(Resolution {
            input,
            matched,
            outcome,
        })
    }

    /// Resolve `args` and invoke the command if the binding is runnable.
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<CommandOutput> {
        let resolution = self.resolve(args)?;
        let command = resolution.matched.command;

        if let Some(err) = resolution.outcome.to_error(command) {
            if err.is_user_error() {
                log::debug!("`{}` not runnable: {err}", command.display_name());
            } else {
                log::error!("{err}");
            }
            return Err(err);
        }

        log::debug!("invoking `{}` {}", command.display_name(), command.id());
        let call = Invocation::new(
            &self.registry,
            resolution.matched.target(),
            &resolution.outcome,
            &self.converters,
        );
        command.handler().invoke(&call)
    }
}
