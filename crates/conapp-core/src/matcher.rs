//! Command matcher: picks the declared command that best fits a request.
//!
//! Several commands may share one display name (overloads). A candidate
//! survives when every required parameter was supplied and every supplied key
//! belongs to a declared parameter. Among survivors, the one leaving the
//! fewest optional parameters unsupplied wins.

use crate::descriptor::{CommandDescriptor, CommandGroupDescriptor, CommandRef, ParameterDescriptor};
use crate::input::ParsedInput;
use crate::registry::Registry;

/// The selected command and how well it fits.
#[derive(Debug, Clone, Copy)]
pub struct CommandMatch<'a> {
    pub group: &'a CommandGroupDescriptor,
    pub command: &'a CommandDescriptor,
    pub missing_optional_options: usize,
    pub missing_optional_arguments: usize,
}

impl<'a> CommandMatch<'a> {
    /// Combined count used for ranking. Lower is better.
    pub fn missing_optional(&self) -> usize {
        self.missing_optional_options + self.missing_optional_arguments
    }

    pub fn target(&self) -> CommandRef<'a> {
        CommandRef {
            group: self.group,
            command: self.command,
        }
    }
}

/// Result of joining supplied keys against one parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterMatch {
    /// A required parameter has no supplied key.
    pub misses_required: bool,
    /// A supplied key has no declared parameter.
    pub unexpected_input: bool,
    /// Optional parameters with no supplied key.
    pub missing_optional: usize,
}

impl ParameterMatch {
    pub fn is_acceptable(&self) -> bool {
        !self.misses_required && !self.unexpected_input
    }
}

/// Full outer join of supplied keys and declared parameters, by name
/// (ASCII case-insensitive).
pub fn join_parameters(keys: &[&str], declared: &[ParameterDescriptor]) -> ParameterMatch {
    let mut result = ParameterMatch {
        unexpected_input: keys
            .iter()
            .any(|key| !declared.iter().any(|p| p.matches(key))),
        ..ParameterMatch::default()
    };
    for parameter in declared {
        if keys.iter().any(|key| parameter.matches(key)) {
            continue;
        }
        if parameter.is_optional {
            result.missing_optional += 1;
        } else {
            result.misses_required = true;
        }
    }
    result
}

/// Find the best-fitting command named `command_name`.
///
/// Only groups whose name prefixes `command_name` are searched, and only
/// their commands are classified. Ties go to the command declared first.
pub fn find_command<'a>(
    registry: &'a Registry,
    command_name: &str,
    option_keys: &[&str],
    argument_keys: &[&str],
) -> Option<CommandMatch<'a>> {
    let mut candidates = Vec::new();

    for group in registry.groups().iter().filter(|g| g.is_prefix_of(command_name)) {
        for command in group.commands() {
            if !command.display_name().eq_ignore_ascii_case(command_name) {
                continue;
            }

            let options = join_parameters(option_keys, command.options());
            let arguments = join_parameters(argument_keys, command.arguments());
            log::trace!(
                "candidate `{command_name}` {}: options {options:?}, arguments {arguments:?}",
                command.id()
            );
            if !options.is_acceptable() || !arguments.is_acceptable() {
                continue;
            }

            candidates.push(CommandMatch {
                group,
                command,
                missing_optional_options: options.missing_optional,
                missing_optional_arguments: arguments.missing_optional,
            });
        }
    }

    let best = candidates.iter().copied().min_by_key(CommandMatch::missing_optional);
    log::debug!(
        "`{command_name}`: {} candidates survived, chose {:?}",
        candidates.len(),
        best.map(|m| m.command.id())
    );
    best
}

/// [`find_command`] for a parsed request.
pub fn find_match<'a>(registry: &'a Registry, input: &ParsedInput) -> Option<CommandMatch<'a>> {
    find_command(
        registry,
        &input.command,
        &input.option_keys(),
        &input.argument_keys(),
    )
}
