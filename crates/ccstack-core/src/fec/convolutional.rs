//! Convolutional Encoder Model
//!
//! A k/n convolutional encoder with one shift register per input bit. The
//! sequential decoder replays this encoder along every branch of the code
//! tree, so the register contents can be saved and restored at will.
//!
//! ## Register Convention
//!
//! ```text
//!  input bit i ──▶ [ r_i(0) r_i(1) ... r_i(L_i - 1) ]   register i, length L_i
//!                     LSB = most recent input
//!
//!  output bit j = XOR over i of parity(register_i & g[i][j])
//! ```
//!
//! Generator masks follow the same convention: bit 0 taps the most recent
//! input bit. The familiar (7, 5) octal pair therefore reads `0o7, 0o5`.
//!
//! ## Standard Codes
//!
//! - **K=3, Rate 1/2**: Generators [0o7, 0o5] (textbook code, free distance 5)
//! - **GSM K=5, Rate 1/2**: Generators [0o23, 0o33]
//! - **NASA K=7, Rate 1/2**: Generators [0o171, 0o133]
//! - **3GPP K=9, Rate 1/3**: Generators [0o557, 0o663, 0o711]

use crate::types::{DecodeError, DecodeResult, InputSymbol, OutputSymbol, Register};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest supported input or output symbol width in bits.
pub const MAX_SYMBOL_BITS: usize = 16;

/// Largest supported register length (registers are `u64`).
pub const MAX_REGISTER_LEN: usize = Register::BITS as usize;

/// The encoder surface the sequential decoder drives.
///
/// Implementations mutate their registers in place, so one encoder must not
/// be shared between decodes running at the same time.
pub trait EncoderModel {
    /// Return to the all-zero initial state.
    fn reset(&mut self);

    /// Current register contents, one entry per input bit.
    fn registers(&self) -> &[Register];

    /// Restore previously saved register contents.
    fn set_registers(&mut self, registers: &[Register]);

    /// Clock one input symbol and return the output symbol.
    ///
    /// With `shift == false` the registers are not stepped again: the bits
    /// inserted by the previous shifting call are replaced by `input`. This
    /// lets a caller try every input symbol at one message position after a
    /// single shift.
    fn encode(&mut self, input: InputSymbol, shift: bool) -> OutputSymbol;

    /// Input symbol width in bits.
    ///
    /// The decoder enumerates all `2^k` input symbols at every position and
    /// rejects models wider than [`MAX_SYMBOL_BITS`].
    fn k(&self) -> usize;

    /// Encoder memory: longest register minus the current input bit.
    fn m(&self) -> usize;

    /// Output symbol width in bits.
    fn n(&self) -> usize;
}

/// Parameters of a convolutional code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeConfig {
    /// Register length for each input bit (constraint length of that input)
    pub constraints: Vec<usize>,
    /// Generator masks: one row per input bit, one mask per output bit
    pub generators: Vec<Vec<Register>>,
}

impl CodeConfig {
    /// Rate 1/n code with a single register of length `constraint_length`.
    pub fn rate_one_over(constraint_length: usize, generators: &[Register]) -> Self {
        Self {
            constraints: vec![constraint_length],
            generators: vec![generators.to_vec()],
        }
    }

    /// Simple rate 1/2, K=3 code (for testing/education).
    ///
    /// Generators: G1=7₈ (111), G2=5₈ (101)
    pub fn simple_k3() -> Self {
        Self::rate_one_over(3, &[0o7, 0o5])
    }

    /// GSM rate 1/2, K=5 convolutional code.
    ///
    /// Generators: G1=23₈, G2=33₈
    pub fn gsm_k5_rate_half() -> Self {
        Self::rate_one_over(5, &[0o23, 0o33])
    }

    /// NASA standard rate 1/2, K=7 convolutional code.
    ///
    /// Generators: G1=171₈, G2=133₈
    /// Used in: CCSDS, IEEE 802.11a/g, DVB-S, Voyager mission
    pub fn nasa_k7_rate_half() -> Self {
        Self::rate_one_over(7, &[0o171, 0o133])
    }

    /// Rate 1/3, K=9 convolutional code.
    ///
    /// Generators: G1=557₈, G2=663₈, G3=711₈
    pub fn k9_rate_third() -> Self {
        Self::rate_one_over(9, &[0o557, 0o663, 0o711])
    }

    /// Input symbol width in bits.
    pub fn k(&self) -> usize {
        self.constraints.len()
    }

    /// Output symbol width in bits.
    pub fn n(&self) -> usize {
        self.generators.first().map_or(0, Vec::len)
    }

    /// Encoder memory (longest register minus one).
    pub fn memory(&self) -> usize {
        self.constraints.iter().copied().max().unwrap_or(1).saturating_sub(1)
    }

    /// Code rate k/n.
    pub fn rate(&self) -> f64 {
        self.k() as f64 / self.n() as f64
    }

    /// Check that the parameters describe a code this crate can run.
    pub fn validate(&self) -> DecodeResult<()> {
        let k = self.k();
        if k == 0 || k > MAX_SYMBOL_BITS {
            return Err(DecodeError::InvalidCode(format!(
                "input width k={} must be within 1..={}",
                k, MAX_SYMBOL_BITS
            )));
        }

        if self.generators.len() != k {
            return Err(DecodeError::InvalidCode(format!(
                "{} generator rows for {} registers",
                self.generators.len(),
                k
            )));
        }

        let n = self.n();
        if n == 0 || n > MAX_SYMBOL_BITS {
            return Err(DecodeError::InvalidCode(format!(
                "output width n={} must be within 1..={}",
                n, MAX_SYMBOL_BITS
            )));
        }

        for (i, (&len, row)) in self.constraints.iter().zip(&self.generators).enumerate() {
            if !(2..=MAX_REGISTER_LEN).contains(&len) {
                return Err(DecodeError::InvalidCode(format!(
                    "register {} length {} must be within 2..={}",
                    i, len, MAX_REGISTER_LEN
                )));
            }

            if row.len() != n {
                return Err(DecodeError::InvalidCode(format!(
                    "generator row {} has {} polynomials, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }

            let mask = register_mask(len);
            if let Some(g) = row.iter().find(|&&g| g & !mask != 0) {
                return Err(DecodeError::InvalidCode(format!(
                    "generator {:o} does not fit register {} of length {}",
                    g, i, len
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for CodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conv(k={}, n={}, constraints={:?}, generators={:?})",
            self.k(),
            self.n(),
            self.constraints,
            self.generators
                .iter()
                .map(|row| row.iter().map(|g| format!("{:o}", g)).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        )
    }
}

#[inline]
fn register_mask(len: usize) -> Register {
    if len >= MAX_REGISTER_LEN {
        Register::MAX
    } else {
        (1 << len) - 1
    }
}

/// Convolutional encoder.
///
/// Encodes input symbols with one shift register per input bit and XOR
/// gates defined by the generator polynomials.
#[derive(Debug, Clone)]
pub struct ConvolutionalEncoder {
    config: CodeConfig,
    masks: Vec<Register>,
    registers: Vec<Register>,
}

impl ConvolutionalEncoder {
    /// Create a new encoder, rejecting parameters it cannot run.
    pub fn new(config: CodeConfig) -> DecodeResult<Self> {
        config.validate()?;
        let masks = config.constraints.iter().map(|&len| register_mask(len)).collect();
        let registers = vec![0; config.k()];
        Ok(Self {
            config,
            masks,
            registers,
        })
    }

    /// Code parameters.
    pub fn config(&self) -> &CodeConfig {
        &self.config
    }

    fn output(&self) -> OutputSymbol {
        let mut out: OutputSymbol = 0;
        for j in 0..self.config.n() {
            let parity = self
                .registers
                .iter()
                .zip(&self.config.generators)
                .fold(0u32, |acc, (&reg, row)| acc ^ (reg & row[j]).count_ones());
            out |= (parity & 1) << j;
        }
        out
    }

    /// Encode a sequence of input symbols from the zero state.
    pub fn encode_message(&mut self, inputs: &[InputSymbol]) -> Vec<OutputSymbol> {
        self.reset();
        inputs.iter().map(|&s| self.encode(s, true)).collect()
    }

    /// Encode a sequence and append `m` all-zero tail symbols, which flush
    /// the encoder back to the zero state.
    ///
    /// Total output length: `inputs.len() + m`
    pub fn encode_terminated(&mut self, inputs: &[InputSymbol]) -> Vec<OutputSymbol> {
        let mut output = self.encode_message(inputs);
        for _ in 0..self.m() {
            output.push(self.encode(0, true));
        }
        output
    }
}

impl EncoderModel for ConvolutionalEncoder {
    fn reset(&mut self) {
        self.registers.iter_mut().for_each(|r| *r = 0);
    }

    fn registers(&self) -> &[Register] {
        &self.registers
    }

    fn set_registers(&mut self, registers: &[Register]) {
        debug_assert_eq!(registers.len(), self.registers.len());
        self.registers.copy_from_slice(registers);
    }

    fn encode(&mut self, input: InputSymbol, shift: bool) -> OutputSymbol {
        for (i, (reg, &mask)) in self.registers.iter_mut().zip(&self.masks).enumerate() {
            let bit = Register::from((input >> i) & 1);
            if shift {
                *reg = ((*reg << 1) | bit) & mask;
            } else {
                *reg = (*reg & !1) | bit;
            }
        }
        self.output()
    }

    fn k(&self) -> usize {
        self.config.k()
    }

    fn m(&self) -> usize {
        self.config.memory()
    }

    fn n(&self) -> usize {
        self.config.n()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_presets() {
        let k3 = CodeConfig::simple_k3();
        assert_eq!(k3.k(), 1);
        assert_eq!(k3.n(), 2);
        assert_eq!(k3.memory(), 2);
        assert_eq!(k3.rate(), 0.5);

        let k9 = CodeConfig::k9_rate_third();
        assert_eq!(k9.n(), 3);
        assert_eq!(k9.memory(), 8);
        assert!(k9.validate().is_ok());
        assert!(CodeConfig::nasa_k7_rate_half().validate().is_ok());
        assert!(CodeConfig::gsm_k5_rate_half().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_codes() {
        let empty = CodeConfig {
            constraints: vec![],
            generators: vec![],
        };
        assert!(matches!(empty.validate(), Err(DecodeError::InvalidCode(_))));

        let too_long = CodeConfig::rate_one_over(65, &[1, 3]);
        assert!(too_long.validate().is_err());

        let wide_poly = CodeConfig::rate_one_over(3, &[0o17, 0o5]);
        assert!(wide_poly.validate().is_err());

        let ragged = CodeConfig {
            constraints: vec![3, 3],
            generators: vec![vec![7, 5], vec![3]],
        };
        assert!(ragged.validate().is_err());

        let missing_row = CodeConfig {
            constraints: vec![3, 3],
            generators: vec![vec![7, 5]],
        };
        assert!(ConvolutionalEncoder::new(missing_row).is_err());
    }

    #[test]
    fn test_k3_known_output() {
        let mut encoder = ConvolutionalEncoder::new(CodeConfig::simple_k3()).unwrap();
        // Input 1011 from zero state with (7,5): 11 10 00 01
        let out = encoder.encode_message(&[1, 0, 1, 1]);
        assert_eq!(out, vec![0b11, 0b01, 0b00, 0b10]);
    }

    #[test]
    fn test_terminated_returns_to_zero() {
        let mut encoder = ConvolutionalEncoder::new(CodeConfig::nasa_k7_rate_half()).unwrap();
        let data = vec![1, 0, 1, 1, 0, 0, 1, 0];
        let coded = encoder.encode_terminated(&data);
        assert_eq!(coded.len(), data.len() + 6);
        // The six most recent register bits form the trellis state
        assert_eq!(encoder.registers()[0] & 0o77, 0);
    }

    #[test]
    fn test_replace_matches_fresh_shift() {
        let mut encoder = ConvolutionalEncoder::new(CodeConfig {
            constraints: vec![3, 4],
            generators: vec![vec![0b111, 0b101, 0b010], vec![0b0010, 0b0011, 0b1111]],
        })
        .unwrap();
        encoder.encode_message(&[3, 1, 2]);
        let snapshot = encoder.registers().to_vec();

        for input in 0..4 {
            encoder.set_registers(&snapshot);
            let fresh = encoder.encode(input, true);
            let fresh_regs = encoder.registers().to_vec();

            encoder.set_registers(&snapshot);
            encoder.encode(0, true);
            let replaced = encoder.encode(input, false);

            assert_eq!(fresh, replaced, "input {}", input);
            assert_eq!(fresh_regs, encoder.registers());
        }
    }

    #[test]
    fn test_reset() {
        let mut encoder = ConvolutionalEncoder::new(CodeConfig::simple_k3()).unwrap();
        encoder.encode(1, true);
        assert_ne!(encoder.registers(), &[0]);
        encoder.reset();
        assert_eq!(encoder.registers(), &[0]);
    }
}
