//! The beacon context.
//!
//! [`Beacon`] is the single object shared by the interrupt handlers and the two tasks. It is
//! created once at startup, usually in a `static` (see [`init_beacon!`](crate::init_beacon)),
//! and owns:
//!
//! - the [`SequenceState`] both tasks coordinate through
//! - one [`EdgeSignal`] per edge source: the bit clock and one latch strobe per family
//! - the precomputed BPSK symbols and the identification payload
//! - the request-to-send outputs, which the trigger ISR raises and the consumer lowers
//!
//! Tasks and the dispatcher borrow it:
//!
//! ```rust,ignore
//! let beacon: Beacon<RtsPin, RtsPin> = Beacon::new();
//! beacon.attach_request_to_send(RequestToSend::new(costas_rts, psk_rts, false))?;
//! let mut producer = beacon.producer();
//! let mut consumer = beacon.consumer(ModeFamily::Costas, loader, delay, DDS_RESET_SETTLE_MS);
//! ```

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::codec::BpskWords;
use crate::consts::{COSTAS_SEQ_LEN, PSK_CARRIER_HZ, PSK_PAYLOAD, PSK_PAYLOAD_MAX_LEN};
use crate::consumer::WordConsumer;
use crate::dispatcher::InterruptDispatcher;
use crate::error::BeaconError;
use crate::loader::DdsPort;
use crate::payload::psk_symbol_count;
use crate::producer::SequenceProducer;
use crate::signal::EdgeSignal;
use crate::state::{ModeFamily, SequenceState, TransmissionMode};

/// The request-to-send outputs that key the transmitter, one per family.
#[derive(Debug)]
pub struct RequestToSend<C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    /// Keys the transmitter for Costas sequences.
    pub costas: C,
    /// Keys the transmitter for BPSK sequences.
    pub psk: P,
    active_low: bool,
}

impl<C, P> RequestToSend<C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    /// Groups the two outputs.
    ///
    /// # Arguments
    /// - `costas`, `psk`: the per-family request-to-send pins
    /// - `active_low`: whether the keying circuit expects LOW for "send"
    pub fn new(costas: C, psk: P, active_low: bool) -> Self {
        Self {
            costas,
            psk,
            active_low,
        }
    }

    fn write(&mut self, family: ModeFamily, asserted: bool) -> Result<(), BeaconError> {
        let state = PinState::from(asserted != self.active_low);
        match family {
            ModeFamily::Costas => self
                .costas
                .set_state(state)
                .map_err(BeaconError::request_to_send),
            ModeFamily::Psk => self
                .psk
                .set_state(state)
                .map_err(BeaconError::request_to_send),
        }
    }
}

/// The shared context of one beacon.
///
/// ## Type Parameters
///
/// - `C`: Costas request-to-send output
/// - `P`: PSK request-to-send output
pub struct Beacon<C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    state: SequenceState,
    bit_clock: EdgeSignal,
    costas_latch: EdgeSignal,
    psk_latch: EdgeSignal,
    bpsk: BpskWords,
    payload: &'static [u8],
    rts: Mutex<RefCell<Option<RequestToSend<C, P>>>>,
}

impl<C, P> Beacon<C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    /// Creates an idle beacon sending [`PSK_PAYLOAD`] in BPSK mode.
    pub const fn new() -> Self {
        Self::with_payload(PSK_PAYLOAD)
    }

    /// Creates an idle beacon sending `payload` in BPSK mode.
    ///
    /// # Panics
    /// If `payload` is longer than [`PSK_PAYLOAD_MAX_LEN`]. In a `static` initializer, such as
    /// the one [`init_beacon!`](crate::init_beacon) emits, this is a compile-time error.
    pub const fn with_payload(payload: &'static [u8]) -> Self {
        assert!(
            payload.len() <= PSK_PAYLOAD_MAX_LEN,
            "identification payload too long"
        );
        Self {
            state: SequenceState::new(),
            bit_clock: EdgeSignal::new(),
            costas_latch: EdgeSignal::new(),
            psk_latch: EdgeSignal::new(),
            bpsk: BpskWords::new(PSK_CARRIER_HZ),
            payload,
            rts: Mutex::new(RefCell::new(None)),
        }
    }

    /// Hands the request-to-send outputs to the beacon and drives both inactive.
    ///
    /// Until this is called, activations run without keying the transmitter.
    pub fn attach_request_to_send(&self, mut rts: RequestToSend<C, P>) -> Result<(), BeaconError> {
        let costas = rts.write(ModeFamily::Costas, false);
        let psk = rts.write(ModeFamily::Psk, false);
        critical_section::with(|cs| {
            let _ = self.rts.borrow(cs).replace(Some(rts));
        });
        costas.and(psk)
    }

    /// Takes the request-to-send outputs back.
    pub fn detach_request_to_send(&self) -> Option<RequestToSend<C, P>> {
        critical_section::with(|cs| self.rts.borrow(cs).take())
    }

    /// The shared sequencing state.
    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    /// The BPSK symbol words.
    pub fn bpsk(&self) -> &BpskWords {
        &self.bpsk
    }

    /// The BPSK identification payload.
    pub fn payload(&self) -> &'static [u8] {
        self.payload
    }

    /// First index past the end of `mode`'s sequence, or `None` if the mode does not end on
    /// its own.
    pub fn terminal_index(&self, mode: TransmissionMode) -> Option<u16> {
        match mode {
            // +1 for the wake word
            TransmissionMode::CostasActive => Some(u16::from(COSTAS_SEQ_LEN) + 1),
            TransmissionMode::PskActive => Some(psk_symbol_count(self.payload)),
            TransmissionMode::Idle | TransmissionMode::PskPreambleActive => None,
        }
    }

    /// The handlers to call from the three edge interrupts.
    pub fn dispatcher(&self) -> InterruptDispatcher<'_, C, P> {
        InterruptDispatcher::new(self)
    }

    /// The word producer task.
    pub fn producer(&self) -> SequenceProducer<'_, C, P> {
        SequenceProducer::new(self)
    }

    /// A word consumer task serving `family`.
    ///
    /// # Arguments
    /// - `family`: the mode family this consumer loads words for
    /// - `port`: the DDS lines, owned or shared through [`SharedPort`](crate::loader::SharedPort)
    /// - `delay`: delay provider for the end-of-sequence reset
    /// - `settle_ms`: how long RESET is held; see
    ///   [`DDS_RESET_SETTLE_MS`](crate::consts::DDS_RESET_SETTLE_MS)
    pub fn consumer<T: DdsPort, D: DelayNs>(
        &self,
        family: ModeFamily,
        port: T,
        delay: D,
        settle_ms: u32,
    ) -> WordConsumer<'_, C, P, T, D> {
        WordConsumer::new(self, family, port, delay, settle_ms)
    }

    pub(crate) fn bit_clock(&self) -> &EdgeSignal {
        &self.bit_clock
    }

    pub(crate) fn latch_signal(&self, family: ModeFamily) -> &EdgeSignal {
        match family {
            ModeFamily::Costas => &self.costas_latch,
            ModeFamily::Psk => &self.psk_latch,
        }
    }

    pub(crate) fn write_request_to_send(
        &self,
        family: ModeFamily,
        asserted: bool,
    ) -> Result<(), BeaconError> {
        critical_section::with(|cs| match self.rts.borrow_ref_mut(cs).as_mut() {
            Some(rts) => rts.write(family, asserted),
            None => Ok(()),
        })
    }
}

impl<C, P> Default for Beacon<C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, P> fmt::Debug for Beacon<C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Beacon")
            .field("state", &self.state)
            .field("bit_clock", &self.bit_clock)
            .field("costas_latch", &self.costas_latch)
            .field("psk_latch", &self.psk_latch)
            .field("bpsk", &self.bpsk)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPin;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[test]
    fn test_beacon_initialization() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::new();
        assert_eq!(beacon.state().mode(), TransmissionMode::Idle);
        assert_eq!(beacon.payload(), PSK_PAYLOAD);
        assert!(!beacon.bit_clock().is_pending());
    }

    #[test]
    fn test_terminal_indices() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::with_payload(b"AB");
        assert_eq!(beacon.terminal_index(TransmissionMode::CostasActive), Some(8));
        assert_eq!(beacon.terminal_index(TransmissionMode::PskActive), Some(17));
        assert_eq!(beacon.terminal_index(TransmissionMode::PskPreambleActive), None);
        assert_eq!(beacon.terminal_index(TransmissionMode::Idle), None);
    }

    #[test]
    fn test_longest_payload_is_accepted() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::with_payload(&[0; PSK_PAYLOAD_MAX_LEN]);
        assert_eq!(
            beacon.terminal_index(TransmissionMode::PskActive),
            Some(65_529)
        );
    }

    #[test]
    #[should_panic(expected = "payload too long")]
    fn test_oversized_payload_is_rejected() {
        let _: Beacon<PinMock, PinMock> = Beacon::with_payload(&[0; PSK_PAYLOAD_MAX_LEN + 1]);
    }

    #[test]
    fn test_outputs_of_different_types() {
        let costas = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let beacon: Beacon<PinMock, RecordingPin> = Beacon::new();
        beacon
            .attach_request_to_send(RequestToSend::new(costas, RecordingPin::default(), false))
            .unwrap();
        beacon
            .write_request_to_send(ModeFamily::Costas, true)
            .unwrap();
        beacon.write_request_to_send(ModeFamily::Psk, true).unwrap();
        beacon
            .write_request_to_send(ModeFamily::Psk, false)
            .unwrap();

        let mut rts = beacon.detach_request_to_send().unwrap();
        rts.costas.done();
        assert_eq!(rts.psk.levels, vec![false, true, false]);
    }

    #[test]
    fn test_attach_drives_outputs_inactive() {
        let costas = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let psk = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let beacon = Beacon::new();
        beacon
            .attach_request_to_send(RequestToSend::new(costas, psk, false))
            .unwrap();

        let mut rts = beacon.detach_request_to_send().unwrap();
        rts.costas.done();
        rts.psk.done();
        assert!(beacon.detach_request_to_send().is_none());
    }

    #[test]
    fn test_active_low_outputs_are_inverted() {
        let costas = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let psk = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let beacon = Beacon::new();
        beacon
            .attach_request_to_send(RequestToSend::new(costas, psk, true))
            .unwrap();
        beacon
            .write_request_to_send(ModeFamily::Costas, true)
            .unwrap();

        let mut rts = beacon.detach_request_to_send().unwrap();
        rts.costas.done();
        rts.psk.done();
    }

    #[test]
    fn test_unattached_outputs_are_skipped() {
        let beacon: Beacon<PinMock, PinMock> = Beacon::new();
        assert_eq!(beacon.write_request_to_send(ModeFamily::Psk, true), Ok(()));
    }
}
