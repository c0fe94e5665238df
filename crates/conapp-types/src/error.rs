//! Error types for conapp.

use std::fmt;
use std::io;

/// Where a rejected value was supplied on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSection {
    /// Between the command name and the first `--` token.
    Option,
    /// A `--key[:value]` token.
    Argument,
}

impl fmt::Display for InputSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Option => f.write_str("option"),
            Self::Argument => f.write_str("argument"),
        }
    }
}

/// A supplied value that could not be converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue {
    pub section: InputSection,
    pub key: String,
    pub raw: String,
}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` = `{}`", self.section, self.key, self.raw)
    }
}

/// Errors produced by the conapp resolution pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ConappError {
    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("malformed token `{token}`: {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("no command matches the supplied options and arguments: {0}")]
    NoMatchingCommand(String),

    #[error("`{command}` is missing required parameters: {}", .parameters.join(", "))]
    MissingRequiredParameters {
        command: String,
        parameters: Vec<String>,
    },

    #[error("invalid parameter values: {}", join_display(.0))]
    InvalidParameterValues(Vec<InvalidValue>),

    #[error(
        "malformed declaration of `{command}`: required parameters not marked as option or argument: {}",
        .parameters.join(", ")
    )]
    MalformedCommandDeclaration {
        command: String,
        parameters: Vec<String>,
    },

    /// Several binding problems found in one pass, in reporting order:
    /// declaration defect, invalid values, missing required parameters.
    #[error("{}", join_errors(.0))]
    BindingFailed(Vec<ConappError>),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConappError {
    /// Whether the failure was caused by what the user typed, as opposed to
    /// a defect in how the commands were declared or wired.
    pub fn is_user_error(&self) -> bool {
        if let Self::BindingFailed(errors) = self {
            return errors.iter().all(Self::is_user_error);
        }
        matches!(
            self,
            Self::CommandNotFound(_)
                | Self::MalformedToken { .. }
                | Self::NoMatchingCommand(_)
                | Self::MissingRequiredParameters { .. }
                | Self::InvalidParameterValues(_)
                | Self::Command(_)
        )
    }
}

fn join_display(values: &[InvalidValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_errors(errors: &[ConappError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConappError>;
