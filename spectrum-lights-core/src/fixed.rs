//! Fixed-width register arithmetic.
//!
//! Registers live in `i32`/`u32` and are forced back to their declared width after every update.
//! Intermediate math happens in 64 bits so nothing panics in debug builds. Bits that don't fit
//! wrap exactly like a hardware register of that width.
use crate::logging::warn;

/// all ones in the low `bits` bits. `bits` must be at most 32
#[inline]
pub const fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// largest value a signed register `bits` wide can hold
#[inline]
pub const fn signed_max(bits: u32) -> i32 {
    mask(bits - 1) as i32
}

/// two's complement wrap into a signed register `bits` wide
#[inline]
pub const fn wrap_signed(value: i64, bits: u32) -> i32 {
    let unused = i64::BITS - bits;

    ((value << unused) >> unused) as i32
}

/// truncate into an unsigned register `bits` wide
#[inline]
pub const fn wrap_unsigned(value: u64, bits: u32) -> u32 {
    (value & mask(bits)) as u32
}

/// like [wrap_signed], but bumps `counter` if any bits were lost
#[inline]
pub fn wrap_signed_counted(value: i64, bits: u32, counter: &mut u32) -> i32 {
    let wrapped = wrap_signed(value, bits);

    if i64::from(wrapped) != value {
        *counter = counter.saturating_add(1);
    }

    wrapped
}

/// like [wrap_unsigned], but bumps `counter` if any bits were lost
#[inline]
pub fn wrap_unsigned_counted(value: u64, bits: u32, counter: &mut u32) -> u32 {
    let wrapped = wrap_unsigned(value, bits);

    if u64::from(wrapped) != value {
        *counter = counter.saturating_add(1);
    }

    wrapped
}

/// How many times each stage dropped bits. Any non-zero count means a variant's widths are too small.
///
/// These are diagnostics, not pipeline registers. Reset leaves them alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overflows {
    pub pcm: u32,
    pub filter: u32,
    pub rectifier: u32,
    pub energy: u32,
}

impl Overflows {
    pub const fn new() -> Self {
        Self {
            pcm: 0,
            filter: 0,
            rectifier: 0,
            energy: 0,
        }
    }

    pub const fn any(&self) -> bool {
        self.pcm > 0 || self.filter > 0 || self.rectifier > 0 || self.energy > 0
    }

    /// warn the first time each kind of overflow shows up
    pub fn warn_new(&self, before: &Self) {
        if before.pcm == 0 && self.pcm > 0 {
            warn!("pcm sample wrapped. pcm_bits is too narrow for the demodulator bias");
        }
        if before.filter == 0 && self.filter > 0 {
            warn!("filter state wrapped. state_bits is too narrow for these coefficients");
        }
        if before.rectifier == 0 && self.rectifier > 0 {
            warn!("rectified magnitude truncated. rectify_shift is too small");
        }
        if before.energy == 0 && self.energy > 0 {
            warn!("energy accumulator wrapped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_signed() {
        assert_eq!(wrap_signed(127, 8), 127);
        assert_eq!(wrap_signed(128, 8), -128);
        assert_eq!(wrap_signed(-129, 8), 127);
        assert_eq!(wrap_signed(189, 8), -67);
        assert_eq!(wrap_signed(-1, 16), -1);
        assert_eq!(wrap_signed(i64::from(i32::MAX) + 1, 32), i32::MIN);
    }

    #[test]
    fn test_wrap_unsigned() {
        assert_eq!(wrap_unsigned(255, 8), 255);
        assert_eq!(wrap_unsigned(256, 8), 0);
        assert_eq!(wrap_unsigned(16, 4), 0);
        assert_eq!(wrap_unsigned(17, 4), 1);
        assert_eq!(wrap_unsigned(u64::from(u32::MAX), 32), u32::MAX);
    }

    #[test]
    fn test_signed_max() {
        assert_eq!(signed_max(8), 127);
        assert_eq!(signed_max(16), 32767);
        assert_eq!(signed_max(1), 0);
    }

    #[test]
    fn test_counted() {
        let mut counter = 0;

        assert_eq!(wrap_signed_counted(100, 8, &mut counter), 100);
        assert_eq!(counter, 0);

        assert_eq!(wrap_signed_counted(200, 8, &mut counter), -56);
        assert_eq!(counter, 1);

        assert_eq!(wrap_unsigned_counted(300, 8, &mut counter), 44);
        assert_eq!(counter, 2);

        assert_eq!(wrap_unsigned_counted(3, 8, &mut counter), 3);
        assert_eq!(counter, 2);
    }

    #[test]
    fn test_any() {
        let mut overflows = Overflows::new();
        assert!(!overflows.any());

        overflows.rectifier = 1;
        assert!(overflows.any());
    }
}
