//! Test doubles shared by the unit tests.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use embedded_hal_mock::eh1::digital::{State as PinState, Transaction as PinTransaction};

use crate::codec::FrequencyWord;
use crate::error::BeaconError;
use crate::loader::DdsPort;

/// A [`DdsPort`] that records what would have been sent.
#[derive(Debug, Default)]
pub(crate) struct RecordingPort {
    pub(crate) loaded: Vec<FrequencyWord>,
    pub(crate) resets: Vec<bool>,
    pub(crate) fail_next_load: bool,
    pub(crate) fail_reset: bool,
}

impl DdsPort for RecordingPort {
    fn load(&mut self, word: FrequencyWord) -> Result<(), BeaconError> {
        if self.fail_next_load {
            self.fail_next_load = false;
            return Err(BeaconError::Line(ErrorKind::Other));
        }
        self.loaded.push(word);
        Ok(())
    }

    fn set_reset(&mut self, asserted: bool) -> Result<(), BeaconError> {
        self.resets.push(asserted);
        if self.fail_reset {
            Err(BeaconError::Line(ErrorKind::Other))
        } else {
            Ok(())
        }
    }
}

/// An infallible output pin that records every level written to it.
#[derive(Debug, Default)]
pub(crate) struct RecordingPin {
    pub(crate) levels: Vec<bool>,
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

/// DATA line transactions for shifting `words` out, LSB first.
pub(crate) fn data_transactions(words: &[FrequencyWord]) -> Vec<PinTransaction> {
    words
        .iter()
        .flat_map(|word| (0..40).map(move |n| (word.raw() >> n) & 1 == 1))
        .map(|bit| PinTransaction::set(if bit { PinState::High } else { PinState::Low }))
        .collect()
}

/// W_CLK line transactions for shifting `count` words out.
pub(crate) fn clock_transactions(count: usize) -> Vec<PinTransaction> {
    (0..count * 40)
        .flat_map(|_| {
            [
                PinTransaction::set(PinState::High),
                PinTransaction::set(PinState::Low),
            ]
        })
        .collect()
}
