use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid gate: {0}")]
    InvalidGate(String),

    #[error("not a permutation: output {output:#x} is produced by both {first:#x} and {second:#x}")]
    NotAPermutation { output: u64, first: u64, second: u64 },

    #[error("line count mismatch: expected {expected}, found {found}")]
    LineMismatch { expected: usize, found: usize },

    #[error("embedding requires {required} lines, but at most {limit} are supported")]
    Capacity { required: usize, limit: usize },

    #[error("inconsistent synthesis state: {0}")]
    Inconsistent(String),

    #[error("SAT solver failure: {0}")]
    Solver(String),
}

pub type Result<T> = std::result::Result<T, Error>;
