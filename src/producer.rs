//! The word producer task.
//!
//! [`SequenceProducer`] computes the next 40-bit word whenever the handoff slot is empty and a
//! sequence is running, then sleeps until the next bit-clock edge. Word selection is the only
//! place where the modes differ:
//!
//! | Mode                | Word for index `i`                                        |
//! |---------------------|-----------------------------------------------------------|
//! | `CostasActive`      | [`word_for_costas_index(i)`](crate::codec::word_for_costas_index) |
//! | `PskPreambleActive` | carrier at 0 degrees                                      |
//! | `PskActive`         | 0 degrees for the sync bit and `0` bits, 180 for `1` bits |

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::beacon::Beacon;
use crate::codec::{FrequencyWord, word_for_costas_index};
use crate::consts::PSK_PREAMBLE_LEN;
use crate::payload::psk_bit;
use crate::state::TransmissionMode;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum ProducerPhase {
    /// Free to compute as soon as the slot is empty.
    Ready,
    /// A word was published; sleeping until the next bit clock.
    AwaitingClock,
}

/// Computes words into the handoff slot.
#[derive(Debug)]
pub struct SequenceProducer<'a, C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    beacon: &'a Beacon<C, P>,
    phase: ProducerPhase,
    activation: u8,
}

impl<'a, C, P> SequenceProducer<'a, C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    /// Creates a producer for `beacon`.
    pub fn new(beacon: &'a Beacon<C, P>) -> Self {
        Self {
            beacon,
            phase: ProducerPhase::Ready,
            activation: beacon.state().activation(),
        }
    }

    /// Whether the producer is sleeping until the next bit clock.
    pub fn is_awaiting_clock(&self) -> bool {
        self.phase == ProducerPhase::AwaitingClock
    }

    /// Advances the producer as far as it can go without blocking.
    ///
    /// Returns the word it published, or `WouldBlock` when it is waiting for the bit clock,
    /// when the previous word has not been latched yet, or when no sequence is running.
    ///
    /// A clock wait belongs to the sequence that published the word. Once that sequence has
    /// ended, or a new one has been triggered, the wait is abandoned so the first word of the
    /// new sequence is produced without waiting for a bit clock.
    pub fn poll(&mut self) -> nb::Result<FrequencyWord, Infallible> {
        let state = self.beacon.state();
        if self.phase == ProducerPhase::AwaitingClock {
            if state.mode().is_active() && state.activation() == self.activation {
                self.beacon.bit_clock().try_take()?;
            }
            self.phase = ProducerPhase::Ready;
        }

        if !state.mode().is_active() || state.is_word_loaded() {
            return Err(nb::Error::WouldBlock);
        }

        if state.mode() == TransmissionMode::PskPreambleActive
            && state.index() >= PSK_PREAMBLE_LEN
        {
            state.enter_payload();
            debug!("preamble sent, starting payload");
        }

        let word = self.select_word(state.mode(), state.index());
        self.activation = state.activation();
        state.publish(word);
        self.phase = ProducerPhase::AwaitingClock;
        Ok(word)
    }

    /// Blocks until the next word is published.
    pub fn produce(&mut self) -> FrequencyWord {
        match nb::block!(self.poll()) {
            Ok(word) => word,
            Err(never) => match never {},
        }
    }

    fn select_word(&self, mode: TransmissionMode, index: u16) -> FrequencyWord {
        let bpsk = self.beacon.bpsk();
        match mode {
            TransmissionMode::CostasActive => {
                word_for_costas_index(u8::try_from(index).unwrap_or(u8::MAX))
            }
            TransmissionMode::PskPreambleActive => bpsk.phase_0,
            TransmissionMode::PskActive => bpsk.for_bit(psk_bit(self.beacon.payload(), index)),
            TransmissionMode::Idle => FrequencyWord::WAKE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BpskWords;
    use crate::consts::PSK_CARRIER_HZ;
    use crate::state::ModeFamily;
    use embedded_hal_mock::eh1::digital::Mock as PinMock;

    #[test]
    fn test_idle_producer_leaves_slot_alone() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::new();
        let mut producer = beacon.producer();
        beacon.dispatcher().on_bit_clock();
        assert_eq!(producer.poll(), Err(nb::Error::WouldBlock));
        assert!(!beacon.state().is_word_loaded());
    }

    #[test]
    fn test_first_word_needs_no_clock() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::new();
        let mut producer = beacon.producer();
        assert_eq!(beacon.dispatcher().on_trigger(ModeFamily::Costas), Ok(true));

        assert_eq!(producer.poll(), Ok(FrequencyWord::WAKE));
        assert!(beacon.state().is_word_loaded());
        assert!(producer.is_awaiting_clock());
    }

    #[test]
    fn test_clock_edges_never_overwrite_unlatched_word() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::new();
        let mut producer = beacon.producer();
        let dispatcher = beacon.dispatcher();
        assert_eq!(dispatcher.on_trigger(ModeFamily::Costas), Ok(true));
        let first = producer.produce();

        for _ in 0..64 {
            dispatcher.on_bit_clock();
            assert_eq!(producer.poll(), Err(nb::Error::WouldBlock));
            assert_eq!(beacon.state().current_word(), first);
            assert_eq!(beacon.state().index(), 0);
        }
    }

    #[test]
    fn test_next_word_waits_for_latch_and_clock() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::new();
        let mut producer = beacon.producer();
        let dispatcher = beacon.dispatcher();
        assert_eq!(dispatcher.on_trigger(ModeFamily::Costas), Ok(true));
        let _ = producer.produce();

        // latched, but no clock yet
        let _ = beacon.state().latch(Some(8));
        assert_eq!(producer.poll(), Err(nb::Error::WouldBlock));

        dispatcher.on_bit_clock();
        assert_eq!(producer.poll(), Ok(word_for_costas_index(1)));
    }

    #[test]
    fn test_preamble_then_payload_words() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::with_payload(&[0x80]);
        let bpsk = BpskWords::new(PSK_CARRIER_HZ);
        let mut producer = beacon.producer();
        let dispatcher = beacon.dispatcher();
        assert_eq!(dispatcher.on_trigger(ModeFamily::Psk), Ok(true));

        for _ in 0..PSK_PREAMBLE_LEN {
            assert_eq!(producer.poll(), Ok(bpsk.phase_0));
            let _ = beacon.state().latch(None);
            dispatcher.on_bit_clock();
        }
        assert_eq!(beacon.state().index(), PSK_PREAMBLE_LEN);

        // sync bit
        assert_eq!(producer.poll(), Ok(bpsk.phase_0));
        assert_eq!(beacon.state().mode(), TransmissionMode::PskActive);
        assert_eq!(beacon.state().index(), 0);

        let _ = beacon.state().latch(Some(9));
        dispatcher.on_bit_clock();
        assert_eq!(producer.poll(), Ok(bpsk.phase_180));

        let _ = beacon.state().latch(Some(9));
        dispatcher.on_bit_clock();
        assert_eq!(producer.poll(), Ok(bpsk.phase_0));
    }

    #[test]
    fn test_clock_wait_abandoned_when_idle() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::new();
        let mut producer = beacon.producer();
        let dispatcher = beacon.dispatcher();
        assert_eq!(dispatcher.on_trigger(ModeFamily::Costas), Ok(true));
        let _ = producer.produce();

        beacon.state().finish();
        assert_eq!(producer.poll(), Err(nb::Error::WouldBlock));
        assert!(!producer.is_awaiting_clock());

        assert_eq!(dispatcher.on_trigger(ModeFamily::Costas), Ok(true));
        assert_eq!(producer.poll(), Ok(FrequencyWord::WAKE));
    }

    #[test]
    fn test_retrigger_before_producer_notices_idle() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::with_payload(b"A");
        let bpsk = BpskWords::new(PSK_CARRIER_HZ);
        let mut producer = beacon.producer();
        let dispatcher = beacon.dispatcher();
        assert_eq!(dispatcher.on_trigger(ModeFamily::Costas), Ok(true));
        let _ = producer.produce();

        // sequence ends and a new one starts between two producer polls
        beacon.state().finish();
        assert_eq!(dispatcher.on_trigger(ModeFamily::Psk), Ok(true));
        assert!(producer.is_awaiting_clock());

        assert_eq!(producer.poll(), Ok(bpsk.phase_0));
        assert_eq!(beacon.state().index(), 0);
    }
}
