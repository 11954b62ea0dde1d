//! Errors surfaced by the beacon.
//!
//! The beacon has no protocol-level failure modes: edges are assumed debounced upstream and
//! every word is computed from fixed tables. The only runtime failures are GPIO writes
//! reported by the HAL, which are reduced to [`embedded_hal::digital::ErrorKind`] so that the
//! error type does not depend on the pin types.

use embedded_hal::digital::ErrorKind;

/// A failed write to one of the beacon's output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum BeaconError {
    /// Writing the DDS DATA, W_CLK or RESET line failed.
    #[error("DDS line write failed: {0:?}")]
    Line(ErrorKind),
    /// Writing a request-to-send output failed.
    #[error("request-to-send write failed: {0:?}")]
    RequestToSend(ErrorKind),
}

impl BeaconError {
    pub(crate) fn line<E: embedded_hal::digital::Error>(err: E) -> Self {
        Self::Line(err.kind())
    }

    pub(crate) fn request_to_send<E: embedded_hal::digital::Error>(err: E) -> Self {
        Self::RequestToSend(err.kind())
    }
}
