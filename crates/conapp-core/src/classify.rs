//! Lazy split of a command's declared parameters by kind.
//!
//! Classification only runs for commands that are actually matched or bound.
//! The result is cached in the descriptor. Two threads racing on the first
//! access may both derive it; the derivation is deterministic, so whichever
//! value is stored first is the same value the other thread computed.

use crate::descriptor::{
    CommandDescriptor, ParameterDeclaration, ParameterDescriptor, ParameterKind,
};

/// A command's parameters, split by kind. Every list is in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifiedParameters {
    /// All parameters, in declaration order.
    pub parameters: Vec<ParameterDescriptor>,
    pub options: Vec<ParameterDescriptor>,
    pub arguments: Vec<ParameterDescriptor>,
    pub unmarked: Vec<ParameterDescriptor>,
    pub context: Vec<ParameterDescriptor>,
}

impl ClassifiedParameters {
    /// Look up a parameter of any kind by name.
    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.matches(name))
    }
}

/// Classify a command's parameters, filling its cache on first use.
pub fn classify(command: &CommandDescriptor) -> &ClassifiedParameters {
    if let Some(cached) = command.classified.get() {
        return cached;
    }
    let derived = classify_declarations(&command.declared);
    log::trace!(
        "classified `{}` ({}): {} options, {} arguments, {} unmarked",
        command.display_name(),
        command.id,
        derived.options.len(),
        derived.arguments.len(),
        derived.unmarked.len(),
    );
    command.classified.get_or_init(|| derived)
}

/// Pure classification of a declaration list.
pub fn classify_declarations(declared: &[ParameterDeclaration]) -> ClassifiedParameters {
    let mut classified = ClassifiedParameters::default();
    for (position, decl) in declared.iter().enumerate() {
        let descriptor = ParameterDescriptor {
            name: decl.name.clone(),
            description: decl.description.clone(),
            value_type: decl.value_type.clone(),
            kind: decl.kind,
            default: decl.default.clone(),
            is_optional: decl.optional || decl.default.is_some(),
            position,
        };
        let bucket = match decl.kind {
            ParameterKind::Option => &mut classified.options,
            ParameterKind::Argument => &mut classified.arguments,
            ParameterKind::Unmarked => &mut classified.unmarked,
            ParameterKind::Context => &mut classified.context,
        };
        bucket.push(descriptor.clone());
        classified.parameters.push(descriptor);
    }
    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ValueType;
    use crate::handler::CommandOutput;
    use crate::registry::{CommandBuilder, RegistryBuilder};

    fn declarations() -> Vec<ParameterDeclaration> {
        vec![
            ParameterDeclaration::option("location", ValueType::String),
            ParameterDeclaration::argument("pretty", ValueType::Boolean).optional(),
            ParameterDeclaration::unmarked("verbosity", ValueType::Integer).with_default("0"),
            ParameterDeclaration::option("unit", ValueType::String).with_default("celsius"),
            ParameterDeclaration::context("group"),
        ]
    }

    #[test]
    fn splits_by_kind_in_declaration_order() {
        let c = classify_declarations(&declarations());
        let names = |ps: &[ParameterDescriptor]| -> Vec<String> {
            ps.iter().map(|p| p.name.clone()).collect()
        };
        assert_eq!(names(&c.options), ["location", "unit"]);
        assert_eq!(names(&c.arguments), ["pretty"]);
        assert_eq!(names(&c.unmarked), ["verbosity"]);
        assert_eq!(names(&c.context), ["group"]);
        assert_eq!(c.parameters.len(), 5);
    }

    #[test]
    fn positions_follow_declaration() {
        let c = classify_declarations(&declarations());
        let positions: Vec<usize> = c.parameters.iter().map(|p| p.position).collect();
        assert_eq!(positions, [0, 1, 2, 3, 4]);
        assert_eq!(c.options[1].position, 3);
    }

    #[test]
    fn default_makes_parameter_optional() {
        let c = classify_declarations(&declarations());
        assert!(!c.options[0].is_optional);
        assert!(c.options[1].is_optional);
        assert!(c.arguments[0].is_optional);
        assert!(c.unmarked[0].is_optional);
    }

    #[test]
    fn get_is_case_insensitive() {
        let c = classify_declarations(&declarations());
        assert_eq!(c.get("LOCATION").map(|p| p.position), Some(0));
        assert!(c.get("missing").is_none());
    }

    #[test]
    fn classification_is_lazy_and_cached() {
        let mut builder = RegistryBuilder::new();
        builder.group("weather", "").command(
            CommandBuilder::new("today", "", |_| Ok(CommandOutput::None))
                .parameter(ParameterDeclaration::option("location", ValueType::String)),
        );
        let registry = builder.build().unwrap();
        let command = &registry.groups()[0].commands()[0];
        assert!(!command.is_classified());

        let first = classify(command) as *const ClassifiedParameters;
        assert!(command.is_classified());
        let second = classify(command) as *const ClassifiedParameters;
        assert_eq!(first, second);
        assert_eq!(command.options().len(), 1);
    }

    #[test]
    fn concurrent_first_access_agrees() {
        let mut builder = RegistryBuilder::new();
        let mut command = CommandBuilder::new("today", "", |_| Ok(CommandOutput::None));
        for decl in declarations() {
            command = command.parameter(decl);
        }
        builder.group("weather", "").command(command);
        let registry = builder.build().unwrap();
        let command = &registry.groups()[0].commands()[0];
        assert!(!command.is_classified());

        let seen: Vec<&ClassifiedParameters> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| classify(command))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let expected = classify_declarations(command.declared_parameters());
        for classified in &seen {
            assert!(std::ptr::eq(*classified, seen[0]));
            assert_eq!(*classified, &expected);
        }
    }

    #[test]
    fn repeated_derivation_is_identical() {
        let decls = declarations();
        assert_eq!(classify_declarations(&decls), classify_declarations(&decls));
    }
}
