/// Declares a static global `BEACON` context.
///
/// The context is built by a `const fn`, so no runtime initialization is needed before the
/// interrupt handlers may touch it. Attach the request-to-send outputs with
/// [`Beacon::attach_request_to_send`](crate::beacon::Beacon::attach_request_to_send) before
/// enabling the trigger interrupts.
///
/// # Arguments
/// - `$costas`: the concrete type of the Costas request-to-send pin (must implement `OutputPin`)
/// - `$psk`: the concrete type of the PSK request-to-send pin (must implement `OutputPin`)
/// - `$payload` (optional): a `&'static [u8]` identification string replacing
///   [`PSK_PAYLOAD`](crate::consts::PSK_PAYLOAD)
///
/// # Example
/// ```rust,ignore
/// init_beacon!(PA5<Output>, PA6<Output>);
/// init_beacon!(PA5<Output>, PA6<Output>, b"N0CALL");
/// ```
#[macro_export]
macro_rules! init_beacon {
    ( $costas:ty, $psk:ty ) => {
        pub static BEACON: $crate::beacon::Beacon<$costas, $psk> = $crate::beacon::Beacon::new();
    };
    ( $costas:ty, $psk:ty, $payload:expr ) => {
        pub static BEACON: $crate::beacon::Beacon<$costas, $psk> =
            $crate::beacon::Beacon::with_payload($payload);
    };
}

/// Forwards a trigger edge for `Costas` or `Psk` to the global `BEACON`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn EXTI3() {
///     trigger_isr!(Costas);
/// }
/// ```
///
/// # Notes
/// - Assumes `BEACON` was declared with `init_beacon!`.
/// - Request-to-send write errors cannot be reported from an ISR and are dropped.
#[macro_export]
macro_rules! trigger_isr {
    ( $family:ident ) => {
        let _ = BEACON
            .dispatcher()
            .on_trigger($crate::state::ModeFamily::$family);
    };
}

/// Forwards a bit-clock edge to the global `BEACON`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn EXTI4() {
///     bit_clock_isr!();
/// }
/// ```
#[macro_export]
macro_rules! bit_clock_isr {
    () => {
        BEACON.dispatcher().on_bit_clock();
    };
}

/// Forwards an FQ_UD strobe edge to the global `BEACON`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn EXTI9_5() {
///     latch_strobe_isr!();
/// }
/// ```
#[macro_export]
macro_rules! latch_strobe_isr {
    () => {
        let _ = BEACON.dispatcher().on_latch_strobe();
    };
}

#[cfg(test)]
mod tests {
    use crate::state::{ModeFamily, TransmissionMode};
    use embedded_hal_mock::eh1::digital::Mock as PinMock;

    init_beacon!(PinMock, PinMock, b"T");

    #[test]
    fn test_isr_macros_drive_global_beacon() {
        trigger_isr!(Psk);
        assert_eq!(BEACON.state().mode(), TransmissionMode::PskPreambleActive);
        trigger_isr!(Costas);
        assert_eq!(BEACON.state().mode(), TransmissionMode::PskPreambleActive);

        bit_clock_isr!();
        latch_strobe_isr!();
        assert!(BEACON.latch_signal(ModeFamily::Psk).is_pending());
        assert!(!BEACON.latch_signal(ModeFamily::Costas).is_pending());
        assert_eq!(BEACON.payload(), b"T");
    }
}
