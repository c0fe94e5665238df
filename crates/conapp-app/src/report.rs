//! Turns command output and resolution errors into printable lines.

use conapp_core::CommandOutput;
use conapp_core::help::HELP_GROUP;
use conapp_types::error::ConappError;

/// Process exit code for a failed run: 1 for bad input, 2 for defects in
/// how commands were declared or wired.
pub fn exit_code(err: &ConappError) -> u8 {
    if err.is_user_error() { 1 } else { 2 }
}

pub fn output_lines(output: &CommandOutput) -> Vec<String> {
    match output {
        CommandOutput::Text(text) => text.lines().map(str::to_string).collect(),
        CommandOutput::Table { headers, rows } => {
            let mut lines = Vec::with_capacity(rows.len() + 1);
            lines.push(headers.join(" | "));
            for row in rows {
                lines.push(row.join(" | "));
            }
            lines
        },
        CommandOutput::None => Vec::new(),
    }
}

pub fn error_lines(err: &ConappError) -> Vec<String> {
    match err {
        ConappError::CommandNotFound(tried) => vec![format!(
            "Command not found: \"{tried}\". Run \"{HELP_GROUP}\" for a list of commands."
        )],
        ConappError::NoMatchingCommand(command) => {
            let group = command.split_whitespace().next().unwrap_or(command);
            vec![format!(
                "No command could be found for provided arguments. Run \"{HELP_GROUP}\" for a \
                 list of commands or \"{group} {HELP_GROUP}\" for help with a specific command."
            )]
        },
        ConappError::InvalidParameterValues(values) => {
            let mut lines =
                vec!["The command could not be run. The following errors occurred:".to_string()];
            for value in values {
                lines.push(format!(
                    "- Invalid value for {} {}: \"{}\"",
                    value.section, value.key, value.raw
                ));
            }
            lines
        },
        ConappError::MissingRequiredParameters {
            command,
            parameters,
        } => {
            let mut lines = vec![format!("\"{command}\" is missing required parameters:")];
            lines.extend(parameters.iter().map(|p| format!("- {p}")));
            lines
        },
        ConappError::MalformedCommandDeclaration {
            command,
            parameters,
        } => {
            let mut lines = vec![format!(
                "Invalid declaration of command \"{command}\". Required parameters must be \
                 declared as an option or an argument. Invalid parameters:"
            )];
            lines.extend(parameters.iter().map(|p| format!("- {p}")));
            lines
        },
        ConappError::BindingFailed(errors) => errors.iter().flat_map(error_lines).collect(),
        other => vec![format!("error: {other}")],
    }
}
