//! The word consumer task.
//!
//! A [`WordConsumer`] serves one mode family. It waits for a ready word, shifts it into the
//! DDS, waits for the FQ_UD strobe that commits it, and then moves the sequence on. One
//! consumer type covers both families; the family only decides which mode it reacts to,
//! which latch signal it waits on and which request-to-send output it lowers at the end.
//!
//! ## Timing
//!
//! The shift must complete before the timing generator raises FQ_UD, otherwise the DDS
//! latches a half-shifted word. Software cannot enforce this; measure it on the bench.
//!
//! ## Shutdown
//!
//! When the held final symbol has been latched the consumer:
//!
//! 1. lowers its request-to-send output,
//! 2. raises the DDS RESET line and holds it for the settle time,
//! 3. releases RESET,
//! 4. returns the sequence state to idle.
//!
//! Every step runs even when an earlier one reports an error, so the beacon always ends up
//! idle and ready for the next trigger.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::beacon::Beacon;
use crate::codec::FrequencyWord;
use crate::error::BeaconError;
use crate::loader::DdsPort;
use crate::state::{LatchOutcome, ModeFamily, TransmissionMode};

/// Progress reported by [`WordConsumer::poll`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ConsumerEvent {
    /// A word was shifted into the DDS and now waits for the latch strobe.
    Shifted {
        /// Mode the word belongs to.
        mode: TransmissionMode,
        /// Sequence index of the word.
        index: u16,
        /// The word itself.
        word: FrequencyWord,
    },
    /// The strobe latched the word; the next word is for `index`.
    Advanced {
        /// The new index.
        index: u16,
    },
    /// The strobe latched the last symbol, which is now sent once more.
    Held {
        /// The held index.
        index: u16,
    },
    /// The final latch came; the DDS was reset and the beacon is idle.
    Completed,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum ConsumerPhase {
    AwaitingWord,
    AwaitingLatch,
}

/// Shifts produced words into the DDS for one mode family.
///
/// ## Type Parameters
///
/// - `C`, `P`: the beacon's request-to-send outputs
/// - `T`: the DDS lines, see [`DdsPort`]
/// - `D`: delay provider for the reset settle time
#[derive(Debug)]
pub struct WordConsumer<'a, C, P, T, D>
where
    C: OutputPin,
    P: OutputPin,
    T: DdsPort,
    D: DelayNs,
{
    beacon: &'a Beacon<C, P>,
    family: ModeFamily,
    /// The DDS lines
    pub port: T,
    delay: D,
    settle_ms: u32,
    phase: ConsumerPhase,
}

impl<'a, C, P, T, D> WordConsumer<'a, C, P, T, D>
where
    C: OutputPin,
    P: OutputPin,
    T: DdsPort,
    D: DelayNs,
{
    /// Creates a consumer for `family`. See [`Beacon::consumer`].
    pub fn new(
        beacon: &'a Beacon<C, P>,
        family: ModeFamily,
        port: T,
        delay: D,
        settle_ms: u32,
    ) -> Self {
        Self {
            beacon,
            family,
            port,
            delay,
            settle_ms,
            phase: ConsumerPhase::AwaitingWord,
        }
    }

    /// The family this consumer serves.
    pub fn family(&self) -> ModeFamily {
        self.family
    }

    /// Whether a word has been shifted out and is waiting for its latch strobe.
    pub fn is_awaiting_latch(&self) -> bool {
        self.phase == ConsumerPhase::AwaitingLatch
    }

    /// Advances the consumer one step without blocking.
    ///
    /// Returns `WouldBlock` while no word is ready for this family, or while the shifted word
    /// waits for its latch strobe.
    ///
    /// A failed shift leaves the word ready, so the next poll retries it.
    pub fn poll(&mut self) -> nb::Result<ConsumerEvent, BeaconError> {
        let state = self.beacon.state();
        match self.phase {
            ConsumerPhase::AwaitingWord => {
                let mode = state.mode();
                if mode.family() != Some(self.family) || !state.is_word_loaded() {
                    return Err(nb::Error::WouldBlock);
                }
                let index = state.index();
                let word = state.current_word();
                // a strobe before the shift cannot latch this word
                self.beacon.latch_signal(self.family).clear();
                self.port.load(word)?;
                self.phase = ConsumerPhase::AwaitingLatch;
                Ok(ConsumerEvent::Shifted { mode, index, word })
            }
            ConsumerPhase::AwaitingLatch => {
                if self.beacon.latch_signal(self.family).try_take().is_err() {
                    return Err(nb::Error::WouldBlock);
                }
                self.phase = ConsumerPhase::AwaitingWord;
                match state.latch(self.beacon.terminal_index(state.mode())) {
                    LatchOutcome::Advanced(index) => Ok(ConsumerEvent::Advanced { index }),
                    LatchOutcome::Held(index) => {
                        debug!("{:?} holding final symbol {}", self.family, index);
                        Ok(ConsumerEvent::Held { index })
                    }
                    LatchOutcome::Complete => {
                        self.shutdown()?;
                        Ok(ConsumerEvent::Completed)
                    }
                }
            }
        }
    }

    /// Blocks until the next event.
    pub fn step(&mut self) -> Result<ConsumerEvent, BeaconError> {
        nb::block!(self.poll())
    }

    fn shutdown(&mut self) -> Result<(), BeaconError> {
        let rts = self.beacon.write_request_to_send(self.family, false);
        let reset = self.port.reset_pulse(&mut self.delay, self.settle_ms);
        self.beacon.state().finish();
        info!("{:?} sequence complete", self.family);
        rts.and(reset)
    }
}
