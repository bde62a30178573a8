//! # Convolutional Code Stack Decoding Library
//!
//! Soft-decision decoding of convolutional codes with the stack, or
//! Zigangirov-Jelinek, sequential algorithm.
//!
//! ## Overview
//!
//! The decoder walks the code tree best-first. Every leaf of the tree is a
//! hypothesis "the message starts with these symbols", scored by a path
//! metric built from the reliability of the symbols the encoder would have
//! sent. Leaves wait in a metric-ordered frontier; the best one is expanded
//! until it reaches the end of the message.
//!
//! - **Encoder model**: replayable k/n convolutional encoder
//! - **Reliability matrix**: per-position symbol likelihoods from the demodulator
//! - **Stack decoder**: frontier, node expansion, bounds, backtracking
//! - **Observers**: hooks after every expansion and at the end of a run
//!
//! ## Signal Flow
//!
//! ```text
//! TX: Data → Conv Encode (+ zero tail) → Modulate → Channel
//! RX: Soft bits → Reliability Matrix → Stack Decoder → Data
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ccstack_core::prelude::*;
//!
//! let mut encoder = ConvolutionalEncoder::new(CodeConfig::simple_k3()).unwrap();
//! let sent = encoder.encode_terminated(&[1, 1, 0, 1]);
//! let relmat = ReliabilityMatrix::from_symbols(2, &sent, 0.9).unwrap();
//!
//! let config = DecoderConfig { zero_tail: true, edge_bias: 0.5, ..Default::default() };
//! let mut decoder = StackDecoder::new(encoder, config);
//! let mut decoded = Vec::new();
//! if decoder.decode(&relmat, &mut decoded).unwrap() {
//!     assert_eq!(decoded, vec![1, 1, 0, 1, 0, 0]);
//! }
//! ```

pub mod config;
pub mod fec;
pub mod observe;
pub mod types;

pub use config::{CcstackConfig, ConfigError};
pub use types::{DecodeError, DecodeOutcome, DecodeResult, InputSymbol, OutputSymbol, Register};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::fec::stack::{DecoderConfig, StackDecoder};
    pub use crate::fec::{
        CodeConfig, ConvolutionalEncoder, EncoderModel, ReliabilityMatrix, ReliabilitySource,
    };
    pub use crate::observe::{DecodeObserver, DecodeStats};
    pub use crate::types::{DecodeError, DecodeOutcome, DecodeResult};
}
