//! Constants used across the beacon implementation.
//!
//! This module defines the fixed frequency plan, the Costas permutation, the BPSK framing
//! and the DDS timing parameters. None of these are adjustable at runtime; the beacon's
//! receivers are built against exactly these values.
//!
//! ## Key Concepts
//!
//! - **Frequency plan**: every tone is `BASEBAND + OFFSET + permutation[i] * STEP`.
//! - **Word layout**: the AD9850 serial word is 40 bits, sent LSB first.
//! - **Preamble**: a run of phase-0 symbols that lets the receiver lock before the payload.
//! - **Settle time**: how long RESET is held high to park the DDS between sequences.

/// Frequency of the reference oscillator clocking the DDS, in Hz.
pub const DDS_CLOCK_HZ: u64 = 125_000_000;

/// Baseband frequency the Costas tones and the BPSK carrier are placed around, in Hz.
pub const BASEBAND_HZ: u64 = 6_000_000;

/// Offset of the lowest Costas tone above [`BASEBAND_HZ`], in Hz.
pub const COSTAS_OFFSET_HZ: u64 = 30_000;

/// Spacing between adjacent Costas tones, in Hz.
pub const COSTAS_STEP_HZ: u64 = 30_000;

/// Number of tones in the Costas array.
pub const COSTAS_SEQ_LEN: u8 = 7;

/// The Costas permutation, indexed from 1.
///
/// Element 0 is a sentinel: sequence index 0 is the all-zero wake word and never reaches
/// the permutation.
pub const COSTAS_PERMUTATION: [u8; COSTAS_SEQ_LEN as usize + 1] = [u8::MAX, 3, 1, 4, 0, 6, 5, 2];

/// Carrier frequency of the BPSK identification message, in Hz.
pub const PSK_CARRIER_HZ: u64 = BASEBAND_HZ;

/// Number of phase-0 symbols sent before the BPSK payload.
pub const PSK_PREAMBLE_LEN: u16 = 8;

/// The identification string sent in BPSK mode, serialized MSB first.
pub const PSK_PAYLOAD: &[u8] = b"DE DDS BEACON";

/// Longest payload whose symbols, sync bit included, can be indexed by a `u16`.
pub const PSK_PAYLOAD_MAX_LEN: usize = (u16::MAX as usize - 1) / 8;

/// Length (in bits) of one serial DDS word.
pub const DDS_WORD_BITS: u8 = 40;

/// Number of steps in the DDS phase wheel (5-bit phase field).
pub const DDS_PHASE_STEPS: u32 = 32;

/// How long the DDS RESET line is held high after power-up and after each sequence, in ms.
pub const DDS_RESET_SETTLE_MS: u32 = 500;

/// Half period of the W_CLK line while shifting a word, in ns.
///
/// The AD9850 only needs 3.5 ns pulses; this leaves a wide margin for slow GPIO.
pub const DDS_BIT_HALF_PERIOD_NS: u32 = 1_000;
