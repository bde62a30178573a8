//! Reliability Matrix
//!
//! Soft-decision input for the decoder: for every message position, the
//! likelihood of each possible output symbol.
//!
//! ```text
//!                 position →
//!            0     1     2    ...   L-1
//!  symbol 0 [0.70  0.05  0.25 ...      ]
//!  symbol 1 [0.10  0.80  0.25 ...      ]
//!  symbol 2 [0.10  0.10  0.25 ...      ]   each column sums to 1
//!  symbol 3 [0.10  0.05  0.25 ...      ]   after normalize()
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ccstack_core::fec::{ReliabilityMatrix, ReliabilitySource};
//!
//! let mut relmat = ReliabilityMatrix::new(2, 2).unwrap();
//! relmat.enter_symbol_data(&[0.7, 0.1, 0.1, 0.1]).unwrap();
//! relmat.enter_erasure().unwrap();
//!
//! assert_eq!(relmat.message_length(), 2);
//! assert_eq!(relmat.reliability(0, 0), 0.7);
//! assert_eq!(relmat.reliability(3, 1), 0.25);
//! ```

use crate::fec::convolutional::MAX_SYMBOL_BITS;
use crate::types::{alphabet_size, DecodeError, DecodeResult, OutputSymbol};
use std::ops::Index;

/// Per-position symbol likelihoods consumed by the decoder.
pub trait ReliabilitySource {
    /// Likelihood of `symbol` at message `position`, expected in (0, 1].
    fn reliability(&self, symbol: OutputSymbol, position: usize) -> f32;

    /// Number of message positions.
    fn message_length(&self) -> usize;

    /// Output symbol width in bits (the matrix has `1 << symbols_log2` rows).
    fn symbols_log2(&self) -> usize;
}

/// Column-major matrix of symbol reliabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilityMatrix {
    symbols_log2: usize,
    nb_symbols: usize,
    message_length: usize,
    /// Columns entered so far
    filled: usize,
    values: Vec<f32>,
}

impl ReliabilityMatrix {
    /// Create an all-zero matrix to be filled column by column.
    pub fn new(symbols_log2: usize, message_length: usize) -> DecodeResult<Self> {
        if symbols_log2 == 0 || symbols_log2 > MAX_SYMBOL_BITS {
            return Err(DecodeError::InvalidReliability(format!(
                "symbol width {} must be within 1..={}",
                symbols_log2, MAX_SYMBOL_BITS
            )));
        }

        let nb_symbols = alphabet_size(symbols_log2);
        Ok(Self {
            symbols_log2,
            nb_symbols,
            message_length,
            filled: 0,
            values: vec![0.0; nb_symbols * message_length],
        })
    }

    /// Matrix of a noiseless transmission: `confidence` on each transmitted
    /// symbol, the remainder spread evenly over the other symbols.
    pub fn from_symbols(
        symbols_log2: usize,
        symbols: &[OutputSymbol],
        confidence: f32,
    ) -> DecodeResult<Self> {
        if !(confidence > 0.0 && confidence <= 1.0) {
            return Err(DecodeError::InvalidReliability(format!(
                "confidence {} must be within (0, 1]",
                confidence
            )));
        }

        let mut relmat = Self::new(symbols_log2, symbols.len())?;
        let rest = (1.0 - confidence) / (relmat.nb_symbols - 1) as f32;
        let mut column = vec![0.0f32; relmat.nb_symbols];

        for &symbol in symbols {
            let row = symbol as usize;
            if row >= relmat.nb_symbols {
                return Err(DecodeError::InvalidReliability(format!(
                    "symbol {} outside a {}-bit alphabet",
                    symbol, symbols_log2
                )));
            }
            column.iter_mut().for_each(|v| *v = rest);
            column[row] = confidence;
            relmat.enter_symbol_data(&column)?;
        }

        Ok(relmat)
    }

    /// Matrix from per-bit log-likelihood ratios, `symbols_log2` values per
    /// position. A positive LLR means the bit is likely 1.
    ///
    /// Bits are assumed independent: the reliability of a symbol is the
    /// product of its bit probabilities. Bit j of a symbol takes
    /// `llrs[position * symbols_log2 + j]`.
    pub fn from_soft_bits(symbols_log2: usize, llrs: &[f64]) -> DecodeResult<Self> {
        if symbols_log2 == 0 || llrs.len() % symbols_log2 != 0 {
            return Err(DecodeError::InvalidReliability(format!(
                "{} soft bits do not split into {}-bit symbols",
                llrs.len(),
                symbols_log2
            )));
        }

        let mut relmat = Self::new(symbols_log2, llrs.len() / symbols_log2)?;
        let mut column = vec![0.0f32; relmat.nb_symbols];

        for bits in llrs.chunks(symbols_log2) {
            if let Some(bad) = bits.iter().find(|v| v.is_nan()) {
                return Err(DecodeError::InvalidReliability(format!("soft bit {}", bad)));
            }

            let p_one: Vec<f64> = bits.iter().map(|&llr| 1.0 / (1.0 + (-llr).exp())).collect();
            for (symbol, value) in column.iter_mut().enumerate() {
                let p: f64 = p_one
                    .iter()
                    .enumerate()
                    .map(|(j, &p1)| if (symbol >> j) & 1 == 1 { p1 } else { 1.0 - p1 })
                    .product();
                *value = p as f32;
            }
            relmat.enter_symbol_data(&column)?;
        }

        Ok(relmat)
    }

    /// Fill the next column with one likelihood per symbol.
    pub fn enter_symbol_data(&mut self, data: &[f32]) -> DecodeResult<()> {
        if self.filled >= self.message_length {
            return Err(DecodeError::InvalidReliability(format!(
                "matrix already holds {} columns",
                self.message_length
            )));
        }

        if data.len() != self.nb_symbols {
            return Err(DecodeError::InvalidReliability(format!(
                "column has {} values, expected {}",
                data.len(),
                self.nb_symbols
            )));
        }

        if let Some(bad) = data.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(DecodeError::InvalidReliability(format!(
                "reliability {} is not a finite non-negative value",
                bad
            )));
        }

        let start = self.filled * self.nb_symbols;
        self.values[start..start + self.nb_symbols].copy_from_slice(data);
        self.filled += 1;
        Ok(())
    }

    /// Fill the next column as an erasure: every symbol equally likely.
    pub fn enter_erasure(&mut self) -> DecodeResult<()> {
        let column = vec![1.0 / self.nb_symbols as f32; self.nb_symbols];
        self.enter_symbol_data(&column)
    }

    /// Scale every column so it sums to 1. All-zero columns become erasures.
    pub fn normalize(&mut self) {
        let uniform = 1.0 / self.nb_symbols as f32;
        for column in self.values.chunks_mut(self.nb_symbols) {
            let sum: f32 = column.iter().sum();
            if sum > 0.0 {
                column.iter_mut().for_each(|v| *v /= sum);
            } else {
                column.iter_mut().for_each(|v| *v = uniform);
            }
        }
    }

    /// Number of columns entered so far.
    pub fn filled_columns(&self) -> usize {
        self.filled
    }

    /// Number of rows (2^symbols_log2).
    pub fn nb_symbols(&self) -> usize {
        self.nb_symbols
    }

    /// Most likely symbol of each column (hard decision).
    pub fn hard_decisions(&self) -> Vec<OutputSymbol> {
        self.values
            .chunks(self.nb_symbols)
            .map(|column| {
                column
                    .iter()
                    .enumerate()
                    .fold((0usize, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
                    .0 as OutputSymbol
            })
            .collect()
    }
}

impl ReliabilitySource for ReliabilityMatrix {
    fn reliability(&self, symbol: OutputSymbol, position: usize) -> f32 {
        self[(symbol, position)]
    }

    fn message_length(&self) -> usize {
        self.message_length
    }

    fn symbols_log2(&self) -> usize {
        self.symbols_log2
    }
}

impl Index<(OutputSymbol, usize)> for ReliabilityMatrix {
    type Output = f32;

    fn index(&self, (symbol, position): (OutputSymbol, usize)) -> &f32 {
        &self.values[position * self.nb_symbols + symbol as usize]
    }
}
