//! Error types for the evolutionary core.

use thiserror::Error;

/// Errors that stop a decode call, a generation transition or start-up.
///
/// Genome length and size errors mean the population state is malformed.
/// The controller aborts the boundary instead of producing a corrupted
/// next generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolutionError {
    #[error("invalid genome length: expected {expected} genes, found {found}")]
    InvalidGenomeLength { expected: usize, found: usize },

    #[error("population size mismatch: expected {expected}, found {found}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EvolutionError>;
