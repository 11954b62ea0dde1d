//! DDS control word computation.
//!
//! The AD9850 takes a 40-bit word over its serial interface:
//!
//! | Bits   | Field                                  |
//! |--------|----------------------------------------|
//! | 0..32  | Tuning word (`f * 2^32 / f_clk`)       |
//! | 32..34 | Control bits (must be zero)            |
//! | 34     | Power-down                             |
//! | 35..40 | Phase, in steps of 360/32 degrees      |
//!
//! Every function here is a `const fn` with integer-only arithmetic, so the words are
//! bit-for-bit reproducible on any target and the BPSK pair can be computed at compile time.
//!
//! ```rust
//! use dds_beacon::codec::word_for_freq_phase;
//!
//! let zero = word_for_freq_phase(6_000_000, 0);
//! let flipped = word_for_freq_phase(6_000_000, 180);
//! assert_eq!(zero.tuning_word(), flipped.tuning_word());
//! assert_eq!(flipped.phase(), 16);
//! ```

use crate::consts::{
    BASEBAND_HZ, COSTAS_OFFSET_HZ, COSTAS_PERMUTATION, COSTAS_STEP_HZ, DDS_CLOCK_HZ,
    DDS_PHASE_STEPS, PSK_CARRIER_HZ,
};

const WORD_MASK: u64 = (1 << 40) - 1;
const PHASE_SHIFT: u32 = 35;
const PHASE_MASK: u64 = 0x1f;
const POWER_DOWN_BIT: u32 = 34;

/// A 40-bit AD9850 serial control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct FrequencyWord(u64);

impl FrequencyWord {
    /// The all-zero word: 0 Hz, phase 0. Sent first to wake the DDS.
    pub const WAKE: Self = Self(0);

    /// Wraps a raw value, discarding anything above bit 39.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw & WORD_MASK)
    }

    /// The raw 40-bit value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The 32-bit frequency tuning word.
    pub const fn tuning_word(self) -> u32 {
        self.0 as u32
    }

    /// The 5-bit phase field.
    pub const fn phase(self) -> u8 {
        ((self.0 >> PHASE_SHIFT) & PHASE_MASK) as u8
    }

    /// Whether the power-down bit is set.
    pub const fn is_powered_down(self) -> bool {
        (self.0 >> POWER_DOWN_BIT) & 1 == 1
    }

    /// Bit `n` of the word, counting from the LSB.
    pub const fn bit(self, n: u8) -> bool {
        (self.0 >> n) & 1 == 1
    }
}

/// Computes the 32-bit tuning word for `frequency_hz`.
///
/// `floor(frequency_hz * 2^32 / DDS_CLOCK_HZ)`: the remainder is truncated, never rounded.
/// Frequencies at or above the DDS clock are out of range for the chip and wrap.
pub const fn tuning_word(frequency_hz: u64) -> u32 {
    ((frequency_hz << 32) / DDS_CLOCK_HZ) as u32
}

/// Builds the word for `frequency_hz` at `phase_degrees`.
///
/// The phase field is `floor(phase_degrees * 32 / 360)`, taken modulo the 32-step wheel.
pub const fn word_for_freq_phase(frequency_hz: u64, phase_degrees: u16) -> FrequencyWord {
    let phase = (phase_degrees as u64 * DDS_PHASE_STEPS as u64 / 360) & PHASE_MASK;
    FrequencyWord::from_raw((phase << PHASE_SHIFT) | tuning_word(frequency_hz) as u64)
}

/// Frequency of Costas tone `index` (1-based), in Hz.
///
/// Returns `None` for the wake index 0 and for indices past the permutation.
pub const fn costas_frequency(index: u8) -> Option<u64> {
    if index == 0 || index as usize >= COSTAS_PERMUTATION.len() {
        return None;
    }
    let slot = COSTAS_PERMUTATION[index as usize] as u64;
    Some(BASEBAND_HZ + COSTAS_OFFSET_HZ + slot * COSTAS_STEP_HZ)
}

/// Builds the word for Costas sequence `index`.
///
/// Index 0 is the all-zero wake word; 1..=7 hop through the permutation at phase 0. Indices
/// past the end of the permutation also yield the wake word.
pub const fn word_for_costas_index(index: u8) -> FrequencyWord {
    match costas_frequency(index) {
        Some(frequency) => word_for_freq_phase(frequency, 0),
        None => FrequencyWord::WAKE,
    }
}

/// The two BPSK symbols on the fixed carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpskWords {
    /// Carrier at 0 degrees; sent for preamble symbols, the sync bit and `0` bits.
    pub phase_0: FrequencyWord,
    /// Carrier at 180 degrees; sent for `1` bits.
    pub phase_180: FrequencyWord,
}

impl BpskWords {
    /// Precomputes both symbols for `carrier_hz`.
    pub const fn new(carrier_hz: u64) -> Self {
        Self {
            phase_0: word_for_freq_phase(carrier_hz, 0),
            phase_180: word_for_freq_phase(carrier_hz, 180),
        }
    }

    /// The symbol for a payload bit.
    pub const fn for_bit(&self, bit: bool) -> FrequencyWord {
        if bit { self.phase_180 } else { self.phase_0 }
    }
}

impl Default for BpskWords {
    fn default() -> Self {
        Self::new(PSK_CARRIER_HZ)
    }
}
