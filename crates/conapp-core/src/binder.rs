//! Parameter binder: converts raw input strings into typed values aligned
//! with a command's declared parameters.
//!
//! Binding never stops at the first failure. Every declared parameter gets
//! exactly one [`BoundSlot`], and every problem is collected into the
//! [`BindingOutcome`] so a single run reports all of them.

use conapp_types::error::{ConappError, InputSection, InvalidValue};

use crate::classify;
use crate::convert::{Converters, Value};
use crate::descriptor::{CommandDescriptor, ParameterDescriptor, ParameterKind, ValueType};
use crate::input::KeyValues;

/// How one declared parameter was bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Converted from input.
    Value(Value),
    /// Optional and not supplied. The declared default (if any) applies.
    Default,
    /// Context parameter: receives the owning group.
    Context,
    /// Supplied, but the converter rejected the raw value.
    Invalid { section: InputSection, raw: String },
    /// Required option or argument that was not supplied.
    Missing,
    /// Required parameter that is neither option nor argument, so it can
    /// never be supplied.
    MalformedDeclaration,
}

/// The binding of one declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSlot {
    pub name: String,
    pub position: usize,
    pub kind: ParameterKind,
    pub binding: Binding,
}

/// Result of binding one command against one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindingOutcome {
    /// One slot per declared parameter, in declaration order.
    pub slots: Vec<BoundSlot>,
    /// Input key to raw value, for options that failed conversion.
    pub invalid_options: KeyValues,
    /// Input key to raw value, for arguments that failed conversion.
    pub invalid_arguments: KeyValues,
    pub unmarked_required_parameters: Vec<String>,
    pub missing_required_parameters: Vec<String>,
}

impl BindingOutcome {
    /// Whether the command may be invoked with this binding.
    pub fn is_runnable(&self) -> bool {
        self.invalid_options.is_empty()
            && self.invalid_arguments.is_empty()
            && self.unmarked_required_parameters.is_empty()
            && self.missing_required_parameters.is_empty()
    }

    pub fn slot(&self, name: &str) -> Option<&BoundSlot> {
        self.slots.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// All rejected values, options first, each in input order.
    pub fn invalid_values(&self) -> Vec<InvalidValue> {
        let section = |section: InputSection, map: &KeyValues| -> Vec<InvalidValue> {
            map.iter()
                .map(|(key, raw)| InvalidValue {
                    section,
                    key: key.to_string(),
                    raw: raw.to_string(),
                })
                .collect()
        };
        let mut values = section(InputSection::Option, &self.invalid_options);
        values.extend(section(InputSection::Argument, &self.invalid_arguments));
        values
    }

    /// The error to report when the outcome is not runnable.
    ///
    /// Every problem found by the binding pass is kept. A single category
    /// is returned as is; several are wrapped in
    /// [`ConappError::BindingFailed`], declaration defects first.
    pub fn to_error(&self, command: &CommandDescriptor) -> Option<ConappError> {
        let mut errors = Vec::new();
        if !self.unmarked_required_parameters.is_empty() {
            errors.push(ConappError::MalformedCommandDeclaration {
                command: command.display_name(),
                parameters: self.unmarked_required_parameters.clone(),
            });
        }
        let invalid = self.invalid_values();
        if !invalid.is_empty() {
            errors.push(ConappError::InvalidParameterValues(invalid));
        }
        if !self.missing_required_parameters.is_empty() {
            errors.push(ConappError::MissingRequiredParameters {
                command: command.display_name(),
                parameters: self.missing_required_parameters.clone(),
            });
        }
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ConappError::BindingFailed(errors)),
        }
    }
}

/// Binds parsed input to command parameters.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    converters: &'a Converters,
    bare_flag_is_true: bool,
}

impl<'a> Binder<'a> {
    pub fn new(converters: &'a Converters) -> Self {
        Self {
            converters,
            bare_flag_is_true: true,
        }
    }

    /// Whether a boolean key given without a value binds `true`. When off,
    /// the empty string goes to the boolean converter like any other value.
    pub fn bare_flag_is_true(mut self, enabled: bool) -> Self {
        self.bare_flag_is_true = enabled;
        self
    }

    /// Bind every declared parameter of `command`. Options are consulted
    /// before arguments; keys match ASCII case-insensitively.
    pub fn bind(
        &self,
        command: &CommandDescriptor,
        options: &KeyValues,
        arguments: &KeyValues,
    ) -> BindingOutcome {
        let classified = classify::classify(command);
        let mut outcome = BindingOutcome::default();

        for parameter in &classified.parameters {
            let binding = self.bind_one(parameter, options, arguments, &mut outcome);
            outcome.slots.push(BoundSlot {
                name: parameter.name.clone(),
                position: parameter.position,
                kind: parameter.kind,
                binding,
            });
        }

        log::debug!(
            "bound `{}`: {} slots, {} invalid, runnable={}",
            command.display_name(),
            outcome.slots.len(),
            outcome.invalid_options.len() + outcome.invalid_arguments.len(),
            outcome.is_runnable(),
        );
        outcome
    }

    fn bind_one(
        &self,
        parameter: &ParameterDescriptor,
        options: &KeyValues,
        arguments: &KeyValues,
        outcome: &mut BindingOutcome,
    ) -> Binding {
        if parameter.kind == ParameterKind::Context {
            return Binding::Context;
        }

        let supplied = options
            .entry(&parameter.name)
            .map(|(key, raw)| (InputSection::Option, key, raw))
            .or_else(|| {
                arguments
                    .entry(&parameter.name)
                    .map(|(key, raw)| (InputSection::Argument, key, raw))
            });

        match supplied {
            Some((section, key, raw)) => match self.convert(parameter, raw) {
                Ok(value) => Binding::Value(value),
                Err(reason) => {
                    log::debug!("{section} `{key}` rejected: {reason}");
                    let invalid = match section {
                        InputSection::Option => &mut outcome.invalid_options,
                        InputSection::Argument => &mut outcome.invalid_arguments,
                    };
                    invalid.insert(key, raw);
                    Binding::Invalid {
                        section,
                        raw: raw.to_string(),
                    }
                },
            },
            None if parameter.is_optional => Binding::Default,
            None if parameter.kind == ParameterKind::Unmarked => {
                outcome.unmarked_required_parameters.push(parameter.name.clone());
                Binding::MalformedDeclaration
            },
            None => {
                outcome.missing_required_parameters.push(parameter.name.clone());
                Binding::Missing
            },
        }
    }

    fn convert(&self, parameter: &ParameterDescriptor, raw: &str) -> Result<Value, String> {
        if self.bare_flag_is_true && raw.is_empty() && parameter.value_type == ValueType::Boolean {
            return Ok(Value::Boolean(true));
        }
        self.converters.convert(&parameter.value_type, raw)
    }
}
