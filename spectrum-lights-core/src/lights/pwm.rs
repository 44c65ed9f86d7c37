use core::fmt;

use crate::audio::BandEnergy;
use crate::fixed::wrap_unsigned;

/// one on/off per band for the current clock cycle. lowest band first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct PwmBands<const N: usize>(pub [bool; N]);

impl<const N: usize> Default for PwmBands<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PwmBands<N> {
    /// everything off
    pub const fn new() -> Self {
        Self([false; N])
    }
}

impl<const N: usize> fmt::Display for PwmBands<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &x in self.0.iter() {
            f.write_str(if x { "#" } else { "." })?;
        }
        Ok(())
    }
}

/// A free running counter shared by every band. Sharing it lines up all the rising edges at the wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmMapper {
    counter: u32,
}

impl PwmMapper {
    pub const fn new() -> Self {
        Self { counter: 0 }
    }

    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// High for `energy` counts out of every `2^bits`.
    ///
    /// An energy of `2^bits` (one past what the register holds) is high the whole time.
    #[inline]
    pub fn outputs<const N: usize>(&self, energy: &BandEnergy<N>) -> PwmBands<N> {
        PwmBands(energy.0.map(|level| self.counter < level))
    }

    #[inline]
    pub const fn next(&self, bits: u32) -> Self {
        Self {
            counter: wrap_unsigned(self.counter as u64 + 1, bits),
        }
    }
}
