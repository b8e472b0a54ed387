//! Error types

use std::path::PathBuf;

use thiserror::Error;

use crate::analyze::MapperKind;
use crate::path_de::PathError;

/// Faults of the JSON-described type system.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("malformed world description: {0}")]
    Parse(#[from] PathError),

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("{owner} refers to undeclared type {referenced}")]
    UnknownTypeReference { owner: String, referenced: String },

    #[error("not an enum: {0}")]
    NotAnEnum(String),
}

/// Failure to resolve a mapper as requested. Type-system faults pass through
/// untouched.
#[derive(Debug, Error)]
pub enum AnalyzeError<E: std::error::Error + 'static> {
    #[error("{mapper}: cannot generate a {kind} mapper for this signature")]
    NotApplicable { mapper: String, kind: MapperKind },

    #[error(transparent)]
    TypeSystem(E),
}
