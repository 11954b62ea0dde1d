//! Runtime glue between the beacon and the host scheduler.
//!
//! The tasks in this crate are non-blocking state machines ([`SequenceProducer::poll`] and
//! [`WordConsumer::poll`]). This module provides the pieces that sit around them:
//!
//! - [`power_up`]: the reset pulse the DDS needs before the first sequence
//! - [`run_producer_loop`] and [`run_consumer_loop`]: never-returning task bodies that poll
//!   and yield with a `DelayNs` (feature `delay-loop`)
//! - [`init_beacon!`](crate::init_beacon) and the `*_isr!` macros: a static [`Beacon`] and
//!   the one-line interrupt handlers that feed it
//!
//! | Task       | Suggested priority | Blocks on                    |
//! |------------|--------------------|------------------------------|
//! | ISRs       | above all tasks    | never                        |
//! | producer   | high               | bit clock                    |
//! | consumer   | low                | ready word, then FQ_UD strobe|
//!
//! [`SequenceProducer::poll`]: crate::producer::SequenceProducer::poll
//! [`WordConsumer::poll`]: crate::consumer::WordConsumer::poll
//! [`Beacon`]: crate::beacon::Beacon

use embedded_hal::delay::DelayNs;

use crate::error::BeaconError;
use crate::loader::DdsPort;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

mod macros;

/// Parks the DDS after power-on by holding RESET high for `settle_ms`.
///
/// Call once, before the first trigger interrupt is enabled.
///
/// # Example
/// ```rust,ignore
/// use dds_beacon::consts::DDS_RESET_SETTLE_MS;
///
/// dds_beacon::runtime::power_up(&mut loader, &mut delay, DDS_RESET_SETTLE_MS)?;
/// ```
pub fn power_up<T: DdsPort, D: DelayNs>(
    port: &mut T,
    delay: &mut D,
    settle_ms: u32,
) -> Result<(), BeaconError> {
    info!("resetting DDS for {} ms", settle_ms);
    port.reset_pulse(delay, settle_ms)
}
