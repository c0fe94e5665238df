//! Command resolution pipeline.
//!
//! Commands are declared in a [`Registry`] of named groups. An argument
//! vector is tokenized into a command name, options and `--arguments`; the
//! matcher picks the best-fitting declared command among overloads sharing
//! that name; the binder converts the raw values to the declared types and
//! collects every failure before anything is invoked.

pub mod binder;
pub mod classify;
pub mod convert;
pub mod descriptor;
pub mod engine;
pub mod handler;
pub mod help;
pub mod input;
pub mod matcher;
pub mod registry;

/// Binds parsed input to a command's declared parameters.
pub use binder::{Binder, Binding, BindingOutcome, BoundSlot};
/// Converted values and the converter registry keyed by value type.
pub use convert::{Converters, Value, ValueConverter};
/// Group, command and parameter descriptors.
pub use descriptor::{
    CommandDescriptor, CommandGroupDescriptor, CommandId, CommandRef, ParameterDeclaration,
    ParameterDescriptor, ParameterKind, ValueType,
};
/// Parse, match, bind and invoke in one call.
pub use engine::{Engine, Resolution};
/// Command handler trait, its output, and the bound call it receives.
pub use handler::{BoundArg, CommandHandler, CommandOutput, Invocation};
/// Tokenized request.
pub use input::{KeyValues, ParsedInput};
/// Best-fit command selection.
pub use matcher::{CommandMatch, find_command};
/// Registry and its builders.
pub use registry::{CommandBuilder, GroupBuilder, Registry, RegistryBuilder};
