//! Core types for sequential decoding
//!
//! Symbols travelling through the decoder are small unsigned integers:
//!
//! - **Input symbols** carry `k` bits, one per encoder register.
//! - **Output symbols** carry `n` bits, one per generator polynomial.
//! - **Registers** are shift registers of up to 64 bits.
//!
//! ```text
//!   input symbol (k bits)          output symbol (n bits)
//!   b(k-1) ... b1 b0   ──encoder──▶  o(n-1) ... o1 o0
//!          │                                  │
//!          └─ bit i enters register i         └─ bit j from generator row j
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Input symbol hypothesis (k bits).
pub type InputSymbol = u32;

/// Encoder output symbol (n bits), also the row index of a reliability matrix.
pub type OutputSymbol = u32;

/// Content of one encoder shift register.
pub type Register = u64;

/// Result type for decoding operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that can occur while building a code or running a decode
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("Reliability matrix has {length} columns, at least the code memory ({memory}) is required")]
    MessageTooShort { length: usize, memory: usize },

    #[error("Reliability matrix symbol width is {actual} bits, code output symbols are {expected} bits")]
    AlphabetMismatch { expected: usize, actual: usize },

    #[error("Invalid code parameters: {0}")]
    InvalidCode(String),

    #[error("Invalid reliability data: {0}")]
    InvalidReliability(String),

    #[error("Frontier is empty")]
    EmptyFrontier,
}

impl DecodeError {
    /// True for errors raised because the reliability source does not fit the code.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DecodeError::MessageTooShort { .. } | DecodeError::AlphabetMismatch { .. }
        )
    }
}

/// How the last decoding run ended.
///
/// Only [`DecodeOutcome::Success`] produces a message. The two other outcomes
/// are normal results of a bounded search and are reported through
/// `decode()` returning `Ok(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeOutcome {
    /// The best frontier node reached the last message position
    Success,
    /// More nodes than the configured budget were materialized
    NodeLimitExceeded,
    /// The metric floor pruned every live hypothesis
    NoViablePath,
}

impl DecodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DecodeOutcome::Success)
    }
}

impl fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeOutcome::Success => write!(f, "success"),
            DecodeOutcome::NodeLimitExceeded => write!(f, "node limit exceeded"),
            DecodeOutcome::NoViablePath => write!(f, "no viable path"),
        }
    }
}

/// Number of distinct symbols for a symbol width in bits.
#[inline]
pub fn alphabet_size(bits: usize) -> usize {
    1usize << bits
}
