//! Bit serialization of the BPSK identification payload.
//!
//! The payload phase of a BPSK sequence is indexed by symbol:
//!
//! - index 0 is the leading synchronization bit, always `0`
//! - index `1 + n` is payload bit `n`, with each byte sent MSB first
//!
//! so a payload of `len` bytes occupies `1 + 8 * len` symbols.

/// Number of payload-phase symbols for `payload`, sync bit included.
///
/// Saturates at `u16::MAX` for payloads longer than
/// [`PSK_PAYLOAD_MAX_LEN`](crate::consts::PSK_PAYLOAD_MAX_LEN).
pub const fn psk_symbol_count(payload: &[u8]) -> u16 {
    let symbols = payload.len().saturating_mul(8).saturating_add(1);
    if symbols > u16::MAX as usize {
        u16::MAX
    } else {
        symbols as u16
    }
}

/// The bit sent at payload-phase symbol `index`.
///
/// Indices past the end of the payload read as `0`.
pub fn psk_bit(payload: &[u8], index: u16) -> bool {
    let Some(offset) = index.checked_sub(1) else {
        // sync
        return false;
    };
    let byte = usize::from(offset / 8);
    let shift = 7 - (offset % 8);
    payload.get(byte).is_some_and(|&b| (b >> shift) & 1 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_bit_is_zero() {
        assert!(!psk_bit(&[0xff], 0));
    }

    #[test]
    fn test_bits_are_msb_first() {
        // 'A' = 0b0100_0001
        let bits: Vec<bool> = (1..=8).map(|i| psk_bit(b"A", i)).collect();
        assert_eq!(
            bits,
            vec![false, true, false, false, false, false, false, true]
        );
    }

    #[test]
    fn test_second_byte_follows_first() {
        let payload = [0x00, 0x80];
        assert!(!psk_bit(&payload, 8));
        assert!(psk_bit(&payload, 9));
        assert!(!psk_bit(&payload, 10));
    }

    #[test]
    fn test_symbol_count_includes_sync_bit() {
        assert_eq!(psk_symbol_count(b""), 1);
        assert_eq!(psk_symbol_count(b"A"), 9);
        assert_eq!(psk_symbol_count(b"DE DDS BEACON"), 1 + 8 * 13);
    }

    #[test]
    fn test_symbol_count_saturates() {
        use crate::consts::PSK_PAYLOAD_MAX_LEN;
        assert_eq!(psk_symbol_count(&[0; PSK_PAYLOAD_MAX_LEN]), 65_529);
        assert_eq!(psk_symbol_count(&[0; PSK_PAYLOAD_MAX_LEN + 1]), u16::MAX);
        assert_eq!(psk_symbol_count(&[0; 10_000]), u16::MAX);
    }

    #[test]
    fn test_out_of_range_reads_zero() {
        assert!(!psk_bit(&[0xff], 9));
        assert!(!psk_bit(&[0xff], u16::MAX));
    }
}
