use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::consumer::{ConsumerEvent, WordConsumer};
use crate::loader::DdsPort;
use crate::producer::SequenceProducer;

/// Runs the producer forever, yielding `yield_us` between polls.
///
/// This is the task body to hand to the host scheduler. The delay is the yield point; on an
/// RTOS use a delay that sleeps the task rather than one that spins.
///
/// # Example
/// ```rust,ignore
/// use dds_beacon::runtime::run_producer_loop;
/// run_producer_loop(BEACON.producer(), &mut delay, 10);
/// ```
pub fn run_producer_loop<C, P, D>(
    mut producer: SequenceProducer<'_, C, P>,
    delay: &mut D,
    yield_us: u32,
) -> !
where
    C: OutputPin,
    P: OutputPin,
    D: DelayNs,
{
    loop {
        match producer.poll() {
            Ok(_) | Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(never)) => match never {},
        }
        delay.delay_us(yield_us);
    }
}

/// Runs a consumer forever, yielding `yield_us` between polls.
///
/// # Notes
/// - A word is shifted as soon as it is ready, without yielding first, so the shift starts
///   as early as possible before the FQ_UD strobe.
/// - Line errors are logged and the loop carries on; a failed shift is retried on the next
///   poll and a failed shutdown still leaves the beacon idle.
pub fn run_consumer_loop<C, P, T, D, Y>(
    mut consumer: WordConsumer<'_, C, P, T, D>,
    delay: &mut Y,
    yield_us: u32,
) -> !
where
    C: OutputPin,
    P: OutputPin,
    T: DdsPort,
    D: DelayNs,
    Y: DelayNs,
{
    loop {
        match consumer.poll() {
            Ok(ConsumerEvent::Shifted { .. }) => continue,
            Ok(_) | Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(e)) => warn!("{:?} consumer: {:?}", consumer.family(), e),
        }
        delay.delay_us(yield_us);
    }
}
