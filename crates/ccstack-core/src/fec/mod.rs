//! Forward Error Correction (FEC) Blocks
//!
//! Soft-decision decoding of convolutional codes with the stack algorithm.
//!
//! ## Available Blocks
//!
//! - [`ConvolutionalEncoder`] - k/n convolutional encoder, the [`EncoderModel`] the decoder replays
//! - [`ReliabilityMatrix`] - per-position symbol likelihoods, the decoder's [`ReliabilitySource`]
//! - [`stack::StackDecoder`] - best-first sequential decoder
//!
//! ## Usage
//!
//! ```rust
//! use ccstack_core::fec::{CodeConfig, ConvolutionalEncoder, ReliabilityMatrix};
//! use ccstack_core::fec::stack::{DecoderConfig, StackDecoder};
//!
//! let mut encoder = ConvolutionalEncoder::new(CodeConfig::nasa_k7_rate_half()).unwrap();
//! let data = vec![1, 1, 0, 1, 0, 0, 1, 1, 1, 0];
//! let sent = encoder.encode_terminated(&data);
//!
//! // Soft bits: positive means 1
//! let llrs: Vec<f64> = sent
//!     .iter()
//!     .flat_map(|&s| (0..2).map(move |j| if (s >> j) & 1 == 1 { 4.0 } else { -4.0 }))
//!     .collect();
//! let relmat = ReliabilityMatrix::from_soft_bits(2, &llrs).unwrap();
//!
//! let config = DecoderConfig { zero_tail: true, edge_bias: 0.5, ..Default::default() };
//! let mut decoder = StackDecoder::new(encoder, config);
//! let mut decoded = Vec::new();
//! assert!(decoder.decode(&relmat, &mut decoded).unwrap());
//! assert_eq!(&decoded[..data.len()], &data[..]);
//! ```

pub mod convolutional;
pub mod reliability;
pub mod stack;

pub use convolutional::{CodeConfig, ConvolutionalEncoder, EncoderModel};
pub use reliability::{ReliabilityMatrix, ReliabilitySource};
