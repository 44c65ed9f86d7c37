//! Use a bank of filters for audio processing.
//!
//! An alternative to an FFT that fits in a few hundred gates. Each band is one recursive section:
//!
//! ```text
//! state[i]  <- state[i] - (A[i] * output[i] >> SHIFT) + (B[i] * sample >> SHIFT)
//! output[i] <- state[i]
//! ```
//!
//! `output` is the state from the previous tick, so a band never reads its own new state. That delay is what
//! gives each band its shape. With a small A the section is a slow low pass with a DC gain of B/A. As A
//! approaches `2^SHIFT` it rings near a sixth of the sample rate and mostly answers to edges in the input.
use crate::audio::PcmSample;
use crate::config::FilterConfig;
use crate::fixed::{Overflows, wrap_signed_counted};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterBank<const N: usize> {
    state: [i32; N],
    /// `state` as of the previous sample tick
    output: [i32; N],
}

impl<const N: usize> Default for FilterBank<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FilterBank<N> {
    pub const fn new() -> Self {
        Self {
            state: [0; N],
            output: [0; N],
        }
    }

    pub const fn outputs(&self) -> &[i32; N] {
        &self.output
    }

    pub const fn states(&self) -> &[i32; N] {
        &self.state
    }

    /// Every band reads the same snapshot, so the order they are computed in doesn't matter.
    pub fn next(
        &self,
        config: &FilterConfig<N>,
        sample_tick: bool,
        sample: PcmSample,
        overflows: &mut Overflows,
    ) -> Self {
        if !sample_tick {
            return *self;
        }

        let sample = i64::from(sample.0);

        let mut next = Self::new();

        for (((next_state, next_output), coefficients), (&state, &output)) in next
            .state
            .iter_mut()
            .zip(next.output.iter_mut())
            .zip(config.coefficients.iter())
            .zip(self.state.iter().zip(self.output.iter()))
        {
            // arithmetic shifts. negative values round towards negative infinity just like the hardware
            let leak = (i64::from(coefficients.leak) * i64::from(output)) >> config.shift;
            let gain = (i64::from(coefficients.gain) * sample) >> config.shift;

            *next_state = wrap_signed_counted(
                i64::from(state) - leak + gain,
                config.state_bits,
                &mut overflows.filter,
            );
            *next_output = state;
        }

        next
    }
}
