//! # dds-beacon
//!
//! A portable, no_std Rust sequencer that drives an AD9850-class direct digital synthesizer
//! (DDS) to transmit a radio beacon in one of two modes:
//!
//! - a frequency-hopped 7-tone **Costas array**, and
//! - a **BPSK** identification message preceded by a phase-0 preamble.
//!
//! An external timing generator supplies three asynchronous edges: a sequence trigger (one per
//! mode), a bit clock, and the DDS frequency-update strobe (FQ_UD). This crate turns those edges
//! into correctly ordered 40-bit control words, shifted into the DDS over its 2-wire serial
//! interface just before the hardware latches them.
//!
//! This crate implements:
//! - `embedded-hal` traits for digital I/O and timing
//! - bit-exact DDS word computation in `const fn`s
//! - a single-slot producer/consumer handoff built on independent atomics
//! - interrupt-safe shared outputs with `critical-section`
//! - non-blocking task bodies using `nb`, plus optional blocking run loops
//!
//! ## Crate features
//! | Feature                | Description |
//! |------------------------|-------------|
//! | `std`                  | Disables `#![no_std]` and enables host `critical-section` support |
//! | `delay-loop` (default) | Blocking task loops driven by `embedded_hal::delay::DelayNs` |
//! | `defmt-0-3`            | Uses `defmt` logging |
//! | `log`                  | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dds_beacon::{init_beacon, state::ModeFamily};
//!
//! init_beacon!(CostasRtsPin, PskRtsPin);
//!
//! fn main() -> ! {
//!     BEACON.attach_request_to_send(RequestToSend::new(costas_rts, psk_rts, false)).ok();
//!     let mut loader = WordLoader::new(data, w_clk, reset, delay.clone(), DDS_BIT_HALF_PERIOD_NS);
//!     dds_beacon::runtime::power_up(&mut loader, &mut delay, DDS_RESET_SETTLE_MS).ok();
//!
//!     let mut consumer =
//!         BEACON.consumer(ModeFamily::Costas, loader, delay.clone(), DDS_RESET_SETTLE_MS);
//!     // spawn `run_producer_loop(BEACON.producer(), ..)` and `run_consumer_loop(consumer, ..)`
//!     // on the host scheduler, then wire the ISRs:
//! }
//!
//! #[interrupt]
//! fn EXTI3() {
//!     dds_beacon::trigger_isr!(Costas);
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - Shifting a word takes 40 W_CLK periods; it must finish before the next FQ_UD edge. That is
//!   a timing contract with the timing generator and has to be checked on the bench.
//! - Only one mode is ever active; triggers that arrive mid-sequence are ignored.
//! - After the last symbol the DDS is held in reset for the settle time before the next
//!   activation can start.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub use critical_section;

#[macro_use]
mod fmt;

pub mod beacon;
pub mod codec;
pub mod consts;
pub mod consumer;
pub mod dispatcher;
pub mod error;
pub mod loader;
pub mod payload;
pub mod producer;
pub mod runtime;
pub mod signal;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
