//! Interrupt-side entry points.
//!
//! The three external edges are wired, by the application, to the methods of
//! [`InterruptDispatcher`]. Each handler does a handful of stores and returns; none of them
//! blocks or takes a lock other than the short critical section around the request-to-send
//! outputs.

use embedded_hal::digital::OutputPin;

use crate::beacon::Beacon;
use crate::error::BeaconError;
use crate::state::ModeFamily;

/// Maps trigger, bit-clock and latch-strobe edges onto a [`Beacon`].
#[derive(Debug)]
pub struct InterruptDispatcher<'a, C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    beacon: &'a Beacon<C, P>,
}

impl<'a, C, P> InterruptDispatcher<'a, C, P>
where
    C: OutputPin,
    P: OutputPin,
{
    /// Creates a dispatcher for `beacon`.
    pub fn new(beacon: &'a Beacon<C, P>) -> Self {
        Self { beacon }
    }

    /// Rising edge on `family`'s trigger input.
    ///
    /// Starts a `family` sequence at index 0 and raises its request-to-send output, but only
    /// while the beacon is idle. A trigger during a running sequence, including one that
    /// bounces, is ignored and `Ok(false)` is returned.
    ///
    /// Pending bit-clock and latch permits left over from before the trigger are dropped, for
    /// both families, so that the new sequence starts in step with the timing generator. A
    /// strobe that lands while the previous sequence is still in its reset settle leaves such
    /// a permit behind.
    pub fn on_trigger(&self, family: ModeFamily) -> Result<bool, BeaconError> {
        let state = self.beacon.state();
        if state.mode().is_active() {
            debug!("trigger {:?} ignored, {:?} running", family, state.mode());
            return Ok(false);
        }
        self.beacon.bit_clock().clear();
        self.beacon.latch_signal(ModeFamily::Costas).clear();
        self.beacon.latch_signal(ModeFamily::Psk).clear();
        let activated = state.try_activate(family);
        debug_assert!(activated, "activation raced from a lower priority");
        info!("{:?} sequence started", family);
        self.beacon.write_request_to_send(family, true)?;
        Ok(activated)
    }

    /// Rising edge on the bit-clock input. Wakes the producer.
    pub fn on_bit_clock(&self) {
        self.beacon.bit_clock().notify();
    }

    /// Rising edge on the FQ_UD strobe. Wakes the consumer of the active family.
    ///
    /// With no sequence running the strobe is dropped and `None` is returned.
    pub fn on_latch_strobe(&self) -> Option<ModeFamily> {
        let family = self.beacon.state().mode().family();
        match family {
            Some(family) => {
                // the other family's consumer must never see this edge
                debug_assert!(
                    !self.beacon.latch_signal(other(family)).is_pending(),
                    "latch pending for an inactive family"
                );
                self.beacon.latch_signal(family).notify();
            }
            None => debug!("latch strobe while idle"),
        }
        family
    }
}

const fn other(family: ModeFamily) -> ModeFamily {
    match family {
        ModeFamily::Costas => ModeFamily::Psk,
        ModeFamily::Psk => ModeFamily::Costas,
    }
}
