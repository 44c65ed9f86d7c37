//! Per-variant parameters.
//!
//! Every variant runs the same pipeline. They only differ in band count, rates, and how many bits each
//! register gets. Coefficient sets are tuned per variant. The small variants round theirs to cheaper
//! values, so each preset sounds a little different. None of them is the "real" response.
use crate::errors::{SpectrumError, SpectrumResult};
use crate::fixed::signed_max;

/// registers wider than this don't fit in the `i32`/`u32` storage
const MAX_BITS: u32 = 31;

/// keeps `window << gain_shift` and `coefficient * state` comfortably inside 64 bits
const MAX_SHIFT: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DemodulatorConfig {
    /// W. sample ticks per pcm sample
    pub window: u32,
    pub accumulator_bits: u32,
    /// scales the count of ones so every window size lands on the same pcm range
    pub gain_shift: u32,
    pub pcm_bits: u32,
}

/// One single-pole section. Both are fractions of `2^shift`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coefficients {
    /// A. subtracted from the state, scaled by the delayed output
    pub leak: u32,
    /// B. added to the state, scaled by the pcm sample
    pub gain: u32,
}

impl Coefficients {
    pub const fn new(leak: u32, gain: u32) -> Self {
        Self { leak, gain }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterConfig<const N: usize> {
    /// lowest band first
    pub coefficients: [Coefficients; N],
    pub shift: u32,
    pub state_bits: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnergyConfig {
    /// K. sample ticks per integration window
    pub window: u32,
    pub rectify_shift: u32,
    /// also the width of the pwm counter
    pub energy_bits: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Variant<const N: usize> {
    pub name: &'static str,
    /// D. fast clock cycles per sample tick
    pub divisor: u32,
    pub demodulator: DemodulatorConfig,
    pub filter: FilterConfig<N>,
    pub energy: EnergyConfig,
}

/// 4 bands with 16 tick windows. The other presets are cut down from this one.
pub const FOUR_BAND: Variant<4> = Variant {
    name: "four-band",
    divisor: 4,
    demodulator: DemodulatorConfig {
        window: 16,
        accumulator_bits: 4,
        gain_shift: 3,
        pcm_bits: 8,
    },
    filter: FilterConfig {
        coefficients: [
            Coefficients::new(16, 16),
            Coefficients::new(96, 48),
            Coefficients::new(192, 80),
            Coefficients::new(240, 96),
        ],
        shift: 8,
        state_bits: 16,
    },
    energy: EnergyConfig {
        window: 16,
        rectify_shift: 3,
        energy_bits: 8,
    },
};

/// 3 bands, 8 tick windows, coefficients rounded towards powers of two
pub const THREE_BAND: Variant<3> = Variant {
    name: "three-band",
    divisor: 8,
    demodulator: DemodulatorConfig {
        window: 8,
        accumulator_bits: 3,
        gain_shift: 4,
        pcm_bits: 8,
    },
    filter: FilterConfig {
        coefficients: [
            Coefficients::new(4, 4),
            Coefficients::new(32, 16),
            Coefficients::new(56, 32),
        ],
        shift: 6,
        state_bits: 12,
    },
    energy: EnergyConfig {
        window: 8,
        rectify_shift: 2,
        energy_bits: 8,
    },
};

/// the smallest one. 4 tick windows and a 6 bit pwm
pub const THREE_BAND_TINY: Variant<3> = Variant {
    name: "three-band-tiny",
    divisor: 16,
    demodulator: DemodulatorConfig {
        window: 4,
        accumulator_bits: 2,
        gain_shift: 5,
        pcm_bits: 8,
    },
    filter: FilterConfig {
        coefficients: [
            Coefficients::new(2, 2),
            Coefficients::new(16, 8),
            Coefficients::new(28, 12),
        ],
        shift: 5,
        state_bits: 10,
    },
    energy: EnergyConfig {
        window: 4,
        rectify_shift: 3,
        energy_bits: 6,
    },
};

impl Default for Variant<4> {
    fn default() -> Self {
        FOUR_BAND
    }
}

fn check_width(register: &'static str, bits: u32) -> SpectrumResult<()> {
    if bits == 0 || bits > MAX_BITS {
        return Err(SpectrumError::InvalidWidth { register, bits });
    }
    Ok(())
}

fn check_window(stage: &'static str, window: u32) -> SpectrumResult<()> {
    if window < 2 || !window.is_power_of_two() {
        return Err(SpectrumError::InvalidWindow { stage, window });
    }
    Ok(())
}

fn check_shift(stage: &'static str, shift: u32) -> SpectrumResult<()> {
    if shift > MAX_SHIFT {
        return Err(SpectrumError::InvalidShift { stage, shift });
    }
    Ok(())
}

impl DemodulatorConfig {
    /// half of the full accumulation range. 50% pdm density maps to 0
    pub const fn bias(&self) -> u32 {
        (self.window << self.gain_shift) / 2
    }

    pub fn validate(&self) -> SpectrumResult<()> {
        check_window("demodulation", self.window)?;
        check_width("pdm accumulator", self.accumulator_bits)?;
        check_width("pcm sample", self.pcm_bits)?;
        check_shift("demodulator gain", self.gain_shift)?;

        // the register only ever holds W - 1 ones. the last bit of a window goes straight into the sample
        if self.window > 1 << self.accumulator_bits {
            return Err(SpectrumError::AccumulatorTooNarrow {
                window: self.window,
                bits: self.accumulator_bits,
            });
        }

        let bias = self.bias();
        if bias > signed_max(self.pcm_bits) as u32 {
            return Err(SpectrumError::PcmTooNarrow {
                bias,
                bits: self.pcm_bits,
            });
        }

        Ok(())
    }
}

impl<const N: usize> FilterConfig<N> {
    pub fn validate(&self) -> SpectrumResult<()> {
        check_width("filter state", self.state_bits)?;
        check_shift("filter", self.shift)?;

        let limit = 1 << self.shift;

        for (band, coefficients) in self.coefficients.iter().enumerate() {
            for value in [coefficients.leak, coefficients.gain] {
                if value >= limit {
                    return Err(SpectrumError::CoefficientOutOfRange {
                        band,
                        value,
                        shift: self.shift,
                    });
                }
            }
        }

        Ok(())
    }
}

impl EnergyConfig {
    /// Width of one rectified magnitude. A full window of them always fits in `energy_bits`.
    pub const fn rectify_bits(&self) -> u32 {
        self.energy_bits - self.window.trailing_zeros()
    }

    pub fn validate(&self) -> SpectrumResult<()> {
        check_window("integration", self.window)?;
        check_width("band energy", self.energy_bits)?;

        if self.rectify_shift > MAX_BITS {
            return Err(SpectrumError::InvalidShift {
                stage: "rectifier",
                shift: self.rectify_shift,
            });
        }

        if self.energy_bits <= self.window.trailing_zeros() {
            return Err(SpectrumError::EnergyTooNarrow {
                window: self.window,
                bits: self.energy_bits,
            });
        }

        Ok(())
    }
}

impl<const N: usize> Variant<N> {
    pub fn validate(&self) -> SpectrumResult<()> {
        if !(3..=4).contains(&N) {
            return Err(SpectrumError::BandCount(N));
        }

        if self.divisor == 0 {
            return Err(SpectrumError::ZeroDivisor);
        }

        self.demodulator.validate()?;
        self.filter.validate()?;
        self.energy.validate()?;

        Ok(())
    }

    /// the pwm counter wraps after this many fast clock cycles
    pub const fn pwm_period(&self) -> u32 {
        1 << self.energy.energy_bits
    }
}
