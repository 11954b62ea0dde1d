//! Shared sequencing state and the mode state machine.
//!
//! [`SequenceState`] is read and written from three contexts: the trigger ISR, the producer
//! task and the consumer task. Every field that the ISR touches is its own atomic, and each
//! update is a single store, so no lock is ever taken in interrupt context and every update
//! is portable to cores without compare-and-swap.
//!
//! ## State machine
//!
//! ```text
//!          trigger(Costas)                        trigger(Psk)
//!   Idle ──────────────────> CostasActive   Idle ──────────────> PskPreambleActive
//!                               │                                   │ 8 symbols
//!                               │                                   v
//!                               │                                PskActive
//!                               │ index+1 == terminal               │ index+1 == terminal
//!                               v                                   v
//!                      awaiting final latch ── one more latch ──> reset ──> Idle
//! ```
//!
//! ## Handoff
//!
//! The word slot holds at most one unconsumed word. The producer writes the word and then
//! sets `word_loaded` (release); the consumer reads `word_loaded` (acquire) and then the word.
//! The consumer writes the next index before it clears `word_loaded`, so the producer always
//! computes for the index that the hardware will latch next.

use core::cell::Cell;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, Ordering};

use critical_section::Mutex;

use crate::codec::FrequencyWord;

/// The beacon's transmission mode. Exactly one is current at any time.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum TransmissionMode {
    /// No sequence running; the DDS is parked and both request-to-send lines are low.
    #[default]
    Idle = 0,
    /// Sending the wake word followed by the seven Costas tones.
    CostasActive = 1,
    /// Sending the run of phase-0 symbols ahead of the BPSK payload.
    PskPreambleActive = 2,
    /// Sending the sync bit and the BPSK payload.
    PskActive = 3,
}

impl TransmissionMode {
    const fn from_tag(tag: u8) -> Self {
        match tag {
            1 => Self::CostasActive,
            2 => Self::PskPreambleActive,
            3 => Self::PskActive,
            _ => Self::Idle,
        }
    }

    /// The family this mode belongs to, or `None` when idle.
    pub const fn family(self) -> Option<ModeFamily> {
        match self {
            Self::Idle => None,
            Self::CostasActive => Some(ModeFamily::Costas),
            Self::PskPreambleActive | Self::PskActive => Some(ModeFamily::Psk),
        }
    }

    /// Whether a sequence is running.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// A transmission mode family: one trigger input, one request-to-send output and one consumer
/// per family.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ModeFamily {
    /// The frequency-hopped Costas array.
    Costas,
    /// The BPSK identification message.
    Psk,
}

impl ModeFamily {
    /// The mode a trigger of this family activates.
    pub const fn entry_mode(self) -> TransmissionMode {
        match self {
            Self::Costas => TransmissionMode::CostasActive,
            Self::Psk => TransmissionMode::PskPreambleActive,
        }
    }
}

/// What a latch strobe did to the sequence.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LatchOutcome {
    /// The index moved on to the contained value.
    Advanced(u16),
    /// The terminal bound was reached; the contained index is sent once more.
    Held(u16),
    /// The held symbol has been latched; the sequence must be shut down.
    Complete,
}

/// Shared state of the running sequence.
pub struct SequenceState {
    mode: AtomicU8,
    activation: AtomicU8,
    index: AtomicU16,
    word_loaded: AtomicBool,
    awaiting_final_latch: AtomicBool,
    word: Mutex<Cell<FrequencyWord>>,
}

impl SequenceState {
    /// Creates an idle state at index 0.
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(TransmissionMode::Idle as u8),
            activation: AtomicU8::new(0),
            index: AtomicU16::new(0),
            word_loaded: AtomicBool::new(false),
            awaiting_final_latch: AtomicBool::new(false),
            word: Mutex::new(Cell::new(FrequencyWord::WAKE)),
        }
    }

    /// The current mode.
    pub fn mode(&self) -> TransmissionMode {
        TransmissionMode::from_tag(self.mode.load(Ordering::Acquire))
    }

    /// Counts activations, wrapping. Changes exactly when a trigger starts a sequence.
    pub fn activation(&self) -> u8 {
        self.activation.load(Ordering::Acquire)
    }

    /// The index of the symbol being produced or sent.
    pub fn index(&self) -> u16 {
        self.index.load(Ordering::Acquire)
    }

    /// Whether a computed word is waiting to be shifted out or latched.
    pub fn is_word_loaded(&self) -> bool {
        self.word_loaded.load(Ordering::Acquire)
    }

    /// Whether the last symbol is being held for its final latch.
    pub fn is_awaiting_final_latch(&self) -> bool {
        self.awaiting_final_latch.load(Ordering::Acquire)
    }

    /// The word in the handoff slot.
    pub fn current_word(&self) -> FrequencyWord {
        critical_section::with(|cs| self.word.borrow(cs).get())
    }

    /// Activates `family` if the beacon is idle.
    ///
    /// Returns `false`, changing nothing, when a sequence is already running.
    pub(crate) fn try_activate(&self, family: ModeFamily) -> bool {
        if self.mode().is_active() {
            return false;
        }
        debug_assert!(!self.is_word_loaded(), "idle beacon holds a word");
        self.index.store(0, Ordering::Relaxed);
        self.awaiting_final_latch.store(false, Ordering::Relaxed);
        // only trigger handlers write this, so load + store is enough
        let activation = self.activation.load(Ordering::Relaxed).wrapping_add(1);
        self.activation.store(activation, Ordering::Relaxed);
        self.mode.store(family.entry_mode() as u8, Ordering::Release);
        true
    }

    /// Puts `word` in the slot and marks it ready.
    pub(crate) fn publish(&self, word: FrequencyWord) {
        debug_assert!(
            !self.is_word_loaded(),
            "word slot overwritten before it was latched"
        );
        critical_section::with(|cs| self.word.borrow(cs).set(word));
        self.word_loaded.store(true, Ordering::Release);
    }

    /// Moves from the preamble to the payload, restarting the index.
    pub(crate) fn enter_payload(&self) {
        debug_assert_eq!(self.mode(), TransmissionMode::PskPreambleActive);
        self.index.store(0, Ordering::Relaxed);
        self.mode.store(TransmissionMode::PskActive as u8, Ordering::Release);
    }

    /// Accounts for the latch strobe of the loaded word.
    ///
    /// `terminal` is the first index past the end of the current mode's sequence, or `None`
    /// when the mode has no end of its own.
    pub(crate) fn latch(&self, terminal: Option<u16>) -> LatchOutcome {
        debug_assert!(self.is_word_loaded(), "latch without a loaded word");
        let index = self.index();
        let next = index.saturating_add(1);
        match terminal {
            Some(end) if next >= end => {
                if self.is_awaiting_final_latch() {
                    // slot stays occupied so nothing is produced during shutdown
                    LatchOutcome::Complete
                } else {
                    self.awaiting_final_latch.store(true, Ordering::Relaxed);
                    self.word_loaded.store(false, Ordering::Release);
                    LatchOutcome::Held(index)
                }
            }
            _ => {
                self.index.store(next, Ordering::Relaxed);
                self.word_loaded.store(false, Ordering::Release);
                LatchOutcome::Advanced(next)
            }
        }
    }

    /// Returns to idle at index 0 with every flag cleared. The mode is written last.
    pub(crate) fn finish(&self) {
        self.index.store(0, Ordering::Relaxed);
        self.awaiting_final_latch.store(false, Ordering::Relaxed);
        self.word_loaded.store(false, Ordering::Relaxed);
        self.mode.store(TransmissionMode::Idle as u8, Ordering::Release);
    }
}

impl Default for SequenceState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceState")
            .field("mode", &self.mode())
            .field("activation", &self.activation())
            .field("index", &self.index())
            .field("word_loaded", &self.is_word_loaded())
            .field("awaiting_final_latch", &self.is_awaiting_final_latch())
            .field("word", &self.current_word())
            .finish()
    }
}
