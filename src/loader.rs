//! Serial word loading for AD9850-class DDS chips.
//!
//! [`WordLoader`] owns the three output lines the beacon drives into the DDS:
//!
//! | Line    | Use                                                           |
//! |---------|---------------------------------------------------------------|
//! | `DATA`  | serial data, sampled by the DDS on the rising edge of `W_CLK` |
//! | `W_CLK` | word clock, one pulse per bit                                 |
//! | `RESET` | master reset, held high to park the DDS                       |
//!
//! The FQ_UD line that commits the shifted word is driven by the external timing generator,
//! not by this crate; the beacon only sees it as the latch strobe interrupt.
//!
//! Consumers talk to the lines through the [`DdsPort`] trait. When two consumers share one
//! set of lines, wrap the loader in a [`critical_section::Mutex`] and hand each consumer a
//! [`SharedPort`].

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::codec::FrequencyWord;
use crate::consts::DDS_WORD_BITS;
use crate::error::BeaconError;

/// Access to a DDS serial interface.
pub trait DdsPort {
    /// Shifts `word` into the DDS input register, LSB first.
    fn load(&mut self, word: FrequencyWord) -> Result<(), BeaconError>;

    /// Drives the RESET line.
    fn set_reset(&mut self, asserted: bool) -> Result<(), BeaconError>;

    /// Holds RESET high for `settle_ms`, then releases it.
    ///
    /// RESET is always released, even if raising it reported an error; the first error is
    /// returned.
    fn reset_pulse<D: DelayNs>(
        &mut self,
        delay: &mut D,
        settle_ms: u32,
    ) -> Result<(), BeaconError> {
        let raised = self.set_reset(true);
        delay.delay_ms(settle_ms);
        let released = self.set_reset(false);
        raised.and(released)
    }
}

/// Bit-banged serial loader over `embedded-hal` output pins.
///
/// ## Type Parameters
///
/// - `DATA`: serial data output
/// - `WCLK`: word clock output
/// - `RST`: DDS master reset output
/// - `D`: delay provider for the W_CLK half period
#[derive(Debug)]
pub struct WordLoader<DATA, WCLK, RST, D>
where
    DATA: OutputPin,
    WCLK: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// DATA pin
    pub data: DATA,
    /// W_CLK pin
    pub w_clk: WCLK,
    /// RESET pin
    pub reset: RST,
    delay: D,
    half_period_ns: u32,
}

impl<DATA, WCLK, RST, D> WordLoader<DATA, WCLK, RST, D>
where
    DATA: OutputPin,
    WCLK: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Creates a loader.
    ///
    /// # Arguments
    /// - `data`, `w_clk`, `reset`: the DDS serial and reset lines
    /// - `delay`: delay provider used between W_CLK edges
    /// - `half_period_ns`: time W_CLK spends high and then low for each bit; see
    ///   [`DDS_BIT_HALF_PERIOD_NS`](crate::consts::DDS_BIT_HALF_PERIOD_NS)
    ///
    /// No line is touched until the first [`load`](DdsPort::load) or reset.
    pub fn new(data: DATA, w_clk: WCLK, reset: RST, delay: D, half_period_ns: u32) -> Self {
        Self {
            data,
            w_clk,
            reset,
            delay,
            half_period_ns,
        }
    }

    /// Gives the pins and the delay back.
    pub fn release(self) -> (DATA, WCLK, RST, D) {
        (self.data, self.w_clk, self.reset, self.delay)
    }
}

impl<DATA, WCLK, RST, D> DdsPort for WordLoader<DATA, WCLK, RST, D>
where
    DATA: OutputPin,
    WCLK: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    fn load(&mut self, word: FrequencyWord) -> Result<(), BeaconError> {
        for n in 0..DDS_WORD_BITS {
            // DATA only changes while W_CLK is low
            self.data
                .set_state(PinState::from(word.bit(n)))
                .map_err(BeaconError::line)?;
            self.w_clk.set_high().map_err(BeaconError::line)?;
            self.delay.delay_ns(self.half_period_ns);
            self.w_clk.set_low().map_err(BeaconError::line)?;
            self.delay.delay_ns(self.half_period_ns);
        }
        Ok(())
    }

    fn set_reset(&mut self, asserted: bool) -> Result<(), BeaconError> {
        self.reset
            .set_state(PinState::from(asserted))
            .map_err(BeaconError::line)
    }
}

/// A [`DdsPort`] borrowed from a loader shared between consumers.
///
/// Each call runs inside a critical section. A load keeps interrupts masked for the 40 bit
/// periods; an edge that arrives meanwhile is serviced as soon as the section ends.
pub struct SharedPort<'a, T> {
    port: &'a Mutex<RefCell<T>>,
}

impl<'a, T: DdsPort> SharedPort<'a, T> {
    /// Borrows the shared loader.
    pub const fn new(port: &'a Mutex<RefCell<T>>) -> Self {
        Self { port }
    }
}

impl<T: DdsPort> DdsPort for SharedPort<'_, T> {
    fn load(&mut self, word: FrequencyWord) -> Result<(), BeaconError> {
        critical_section::with(|cs| self.port.borrow_ref_mut(cs).load(word))
    }

    fn set_reset(&mut self, asserted: bool) -> Result<(), BeaconError> {
        critical_section::with(|cs| self.port.borrow_ref_mut(cs).set_reset(asserted))
    }
}

impl<T> fmt::Debug for SharedPort<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPort").finish_non_exhaustive()
    }
}
