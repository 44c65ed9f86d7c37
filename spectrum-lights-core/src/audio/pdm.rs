//! Boxcar PDM demodulation.
//!
//! Count the ones over a window of sample ticks, then re-center the count around zero. Between windows the
//! last sample is held.
use crate::config::DemodulatorConfig;
use crate::fixed::{Overflows, wrap_signed_counted, wrap_unsigned};

/// signed amplitude. with the preset configs this is always in `[-64, 64]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct PcmSample(pub i32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PdmDemodulator {
    /// ones seen so far in this window
    accumulator: u32,
    /// position inside the window
    window: u32,
    sample: PcmSample,
}

impl PdmDemodulator {
    pub const fn new() -> Self {
        Self {
            accumulator: 0,
            window: 0,
            sample: PcmSample(0),
        }
    }

    /// the most recently completed window
    pub const fn sample(&self) -> PcmSample {
        self.sample
    }

    pub fn next(
        &self,
        config: &DemodulatorConfig,
        sample_tick: bool,
        bit: bool,
        overflows: &mut Overflows,
    ) -> Self {
        if !sample_tick {
            return *self;
        }

        let count = self.accumulator + u32::from(bit);

        if self.window == config.window - 1 {
            // this tick's bit counts too, so each sample covers exactly `window` bits
            let centered = (i64::from(count) << config.gain_shift) - i64::from(config.bias());

            let sample = wrap_signed_counted(centered, config.pcm_bits, &mut overflows.pcm);

            Self {
                accumulator: 0,
                window: 0,
                sample: PcmSample(sample),
            }
        } else {
            Self {
                accumulator: wrap_unsigned(count.into(), config.accumulator_bits),
                window: self.window + 1,
                sample: self.sample,
            }
        }
    }
}
