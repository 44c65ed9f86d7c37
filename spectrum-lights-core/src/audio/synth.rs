//! PDM bitstreams to test with when there's no microphone around.
use core::f32::consts::PI;

// with std enabled, the inherent f32 methods win and this goes unused
#[allow(unused_imports)]
use micromath::F32Ext;

/// Runs of ones then runs of zeros. A crude tone that starts high.
#[derive(Clone, Debug)]
pub struct SquareTone {
    half_period: u32,
    position: u32,
}

impl SquareTone {
    /// `half_period` is in fast clock cycles
    pub fn new(half_period: u32) -> Self {
        Self {
            half_period: half_period.max(1),
            position: 0,
        }
    }
}

impl Iterator for SquareTone {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let high = self.position < self.half_period;

        self.position += 1;
        if self.position == self.half_period * 2 {
            self.position = 0;
        }

        Some(high)
    }
}

/// A sine wave run through a first order sigma-delta modulator. This is roughly what a PDM microphone sends.
#[derive(Clone, Debug)]
pub struct SineDelta {
    period: u32,
    amplitude: f32,
    phase: u32,
    integrator: f32,
}

impl SineDelta {
    /// `period` is in fast clock cycles. `amplitude` is clamped to `[0, 1]`
    pub fn new(period: u32, amplitude: f32) -> Self {
        Self {
            period: period.max(1),
            amplitude: amplitude.clamp(0.0, 1.0),
            phase: 0,
            integrator: 0.0,
        }
    }
}

impl Iterator for SineDelta {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        let x = self.amplitude * (2.0 * PI * self.phase as f32 / self.period as f32).sin();

        let high = self.integrator >= 0.0;
        let y = if high { 1.0 } else { -1.0 };

        self.integrator += x - y;

        self.phase += 1;
        if self.phase == self.period {
            self.phase = 0;
        }

        Some(high)
    }
}

#[cfg(test)]
mod tests {
    use super::{SineDelta, SquareTone};

    #[test]
    fn test_square_tone() {
        let mut bits = [false; 12];
        for (x, bit) in bits.iter_mut().zip(SquareTone::new(3)) {
            *x = bit;
        }

        assert_eq!(
            bits,
            [
                true, true, true, false, false, false, true, true, true, false, false, false
            ]
        );
    }

    #[test]
    fn test_square_tone_zero_is_one() {
        let ones = SquareTone::new(0).take(10).filter(|&x| x).count();

        assert_eq!(ones, 5);
    }

    #[test]
    fn test_sine_delta_density() {
        let mut sine = SineDelta::new(64, 0.9);

        for _ in 0..10 {
            let mut first_half = 0;
            let mut second_half = 0;

            for i in 0..64 {
                if sine.next() == Some(true) {
                    if i < 32 {
                        first_half += 1;
                    } else {
                        second_half += 1;
                    }
                }
            }

            // half the bits over a whole period, mostly during the positive half
            assert!((31..=33).contains(&(first_half + second_half)));
            assert!(first_half > second_half + 12, "{} {}", first_half, second_half);
        }
    }

    #[test]
    fn test_sine_delta_silence() {
        let ones = SineDelta::new(64, 0.0).take(100).filter(|&x| x).count();

        assert_eq!(ones, 50);
    }
}
