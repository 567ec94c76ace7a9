//! Error types for every stage of the pipeline.
//!
//! Errors are values: nothing in the compiler or resolver aborts the process.
//! Each stage wraps the error of the stage below with enough context (entity,
//! service, endpoint, type name) for the CLI layer to report it.

use std::path::PathBuf;

use thiserror::Error;

use crate::ir::types::TypeKind;

/// A `DynamicType` violates one of its structural invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("array type has no element type")]
    ArrayWithoutElement,
    #[error("array type declares {0} element types, expected exactly one")]
    ArrayArity(usize),
    #[error("generic type has an empty name")]
    GenericWithoutName,
    #[error("user type has an empty reference")]
    UserWithoutReference,
    #[error("expected an array type, found {0}")]
    NotAnArray(TypeKind),
    #[error("expected a generic type, found {0}")]
    NotAGeneric(TypeKind),
}

/// Import resolution and provider registration failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("failed to resolve provider for type '{type_name}'")]
    UnresolvedType { type_name: String },
    #[error(
        "type '{type_name}' is already provided by '{existing}', refusing to register it under '{requested}'"
    )]
    ConflictingProvider {
        type_name: String,
        existing: String,
        requested: String,
    },
}

/// Failure while compiling an API definition into IR.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("malformed type in {context}: {source}")]
    MalformedType {
        context: String,
        #[source]
        source: TypeError,
    },
    #[error("failed to resolve imports for {artifact}: {source}")]
    Imports {
        artifact: String,
        #[source]
        source: ImportError,
    },
    #[error("failed to register provider locations: {source}")]
    Registration {
        #[source]
        source: ImportError,
    },
    #[error("{artifact} declares '{name}', which is already provided by '{provider}'")]
    NameCollision {
        artifact: String,
        name: String,
        provider: String,
    },
    #[error("'{name}' would be generated into '{location}', which already holds '{existing}'")]
    LocationTaken {
        name: String,
        location: String,
        existing: String,
    },
}

/// Failure while rendering IR into target source text.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render type of {context}: {source}")]
    Type {
        context: String,
        #[source]
        source: TypeError,
    },
    #[error("cannot expand URI template '{template}': {reason}")]
    Template { template: String, reason: String },
    #[error("cannot render value of {context}: {reason}")]
    Value { context: String, reason: String },
}

/// Top-level error of a generator run, as seen by the CLI.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse API definition {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("failed to render {artifact}: {source}")]
    Render {
        artifact: String,
        #[source]
        source: RenderError,
    },
    #[error("failed to write output {}: {reason}", path.display())]
    Output { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_type_names_the_type() {
        let err = ImportError::UnresolvedType {
            type_name: "Pet".into(),
        };
        assert_eq!(err.to_string(), "failed to resolve provider for type 'Pet'");
    }

    #[test]
    fn test_compile_error_carries_context() {
        let err = CompileError::MalformedType {
            context: "endpoint 'getPets' of service 'pets' (response body)".into(),
            source: TypeError::ArrayWithoutElement,
        };
        let message = err.to_string();
        assert!(message.contains("getPets"));
        assert!(message.contains("array type has no element type"));
    }
}
